//! Strictly ordered async iteration.

use std::future::Future;

use futures_util::{stream, StreamExt, TryStreamExt};

/// Run `handler` over `items` one at a time, in order.
///
/// The handler for an item starts only after the previous one settled.
/// The first error stops the iteration and is returned as-is; items after
/// it are never handled.
pub async fn each<I, F, Fut, T, E>(items: I, handler: F) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    stream::iter(items).then(handler).try_collect().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let results: Result<Vec<_>, ()> = each(vec![3u64, 1, 2], |n| async move {
            tokio::time::sleep(Duration::from_millis(n * 5)).await;
            Ok(n * 10)
        })
        .await;
        assert_eq!(results.unwrap(), vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn test_handlers_do_not_overlap() {
        let spans = RefCell::new(Vec::new());

        let _: Result<Vec<()>, ()> = each(["echo a", "echo b", "echo c"], |item| {
            let spans = &spans;
            async move {
                let start = Instant::now();
                tokio::time::sleep(Duration::from_millis(10)).await;
                spans.borrow_mut().push((item, start, Instant::now()));
                Ok(())
            }
        })
        .await;

        let spans = spans.into_inner();
        assert_eq!(spans.len(), 3);
        for pair in spans.windows(2) {
            assert!(pair[1].1 >= pair[0].2, "{} started before {} ended", pair[1].0, pair[0].0);
        }
    }

    #[test]
    fn test_stops_at_first_error() {
        let mut seen = Vec::new();
        let result: Result<Vec<&str>, String> = tokio_test::block_on(each(
            ["echo a", "false", "echo c"],
            |item| {
                seen.push(item);
                async move {
                    if item == "false" {
                        Err(format!("{} failed", item))
                    } else {
                        Ok(item)
                    }
                }
            },
        ));

        assert_eq!(result.unwrap_err(), "false failed");
        assert_eq!(seen, vec!["echo a", "false"]);
    }

    #[test]
    fn test_empty_input() {
        let result: Result<Vec<u8>, ()> =
            tokio_test::block_on(each(Vec::<u8>::new(), |n| async move { Ok(n) }));
        assert!(result.unwrap().is_empty());
    }
}
