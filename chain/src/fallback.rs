//! ordered-fallback helper shared by the rpc endpoint probe and the
//! content gateway fetch

use std::{fmt::Display, future::Future, time::Duration};
use tracing::debug;

/// try candidates in order and return the first success.
/// every attempt is bounded by its own timeout; a failed or timed-out
/// candidate is skipped, never retried.
pub async fn first_ok<I, T, E, F, Fut>(candidates: I, per_attempt: Duration, mut op: F) -> Option<T>
where
    I: IntoIterator,
    I::Item: Display,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    for candidate in candidates {
        let name = candidate.to_string();
        match tokio::time::timeout(per_attempt, op(candidate)).await {
            Ok(Ok(val)) => return Some(val),
            Ok(Err(e)) => {
                debug!(endpoint = name, error = e.to_string(), "endpoint failed");
            }
            Err(_) => {
                debug!(endpoint = name, "endpoint timed out");
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[tokio::test]
    async fn returns_first_success() -> Result<()> {
        let endpoints = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
        let got = first_ok(endpoints.iter(), Duration::from_secs(1), |e| async move {
            if e == "c" {
                Ok(e.clone())
            } else {
                Err("down".to_owned())
            }
        })
        .await;
        assert_eq!(got, Some("c".to_owned()));
        Ok(())
    }

    #[tokio::test]
    async fn none_when_all_fail() -> Result<()> {
        let endpoints = vec!["a".to_owned(), "b".to_owned()];
        let got = first_ok(endpoints.iter(), Duration::from_secs(1), |_e| async move {
            Err::<u32, _>("down".to_owned())
        })
        .await;
        assert_eq!(got, None);
        Ok(())
    }

    #[tokio::test]
    async fn slow_candidate_is_skipped() -> Result<()> {
        let endpoints = vec!["slow".to_owned(), "fast".to_owned()];
        let got = first_ok(endpoints.iter(), Duration::from_millis(50), |e| async move {
            if e == "slow" {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }
            Ok::<_, String>(e.clone())
        })
        .await;
        assert_eq!(got, Some("fast".to_owned()));
        Ok(())
    }
}
