use std::future::Future;

use anyhow::{Error, Result};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{event::market_summary::MarketSummaryTask, logging};

/// 啟動排程
///
/// `cron_expr` 含秒，例如 `* * * * * *` 為每秒一次。
pub async fn start(
    sched: &JobScheduler,
    cron_expr: &str,
    market_summary: MarketSummaryTask,
) -> Result<()> {
    //                 sec  min   hour   day of month   month   day of week   year
    //let expression = "0   30   9,12,15     1,15       May-Aug  Mon,Wed,Fri  2018/2";
    let job = create_job(cron_expr, move || {
        let task = market_summary.clone();
        async move {
            task.execute().await;
            Ok::<(), Error>(())
        }
    })?;

    sched.add(job).await?;
    sched.start().await?;

    logging::info_file_async(format!("排程已啟動 cron: {}", cron_expr));

    Ok(())
}

fn create_job<F, Fut>(cron_expr: &str, task: F) -> Result<Job>
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Error>> + Send,
{
    let expr = cron_expr.to_string();
    Ok(Job::new_async(cron_expr, move |_uuid, _l| {
        let task = task.clone();
        let expr = expr.clone();
        Box::pin(async move {
            if let Err(why) = task().await {
                logging::error_file_async(format!(
                    "Failed to execute task({}) because {:?}",
                    expr, why
                ));
            }
        })
    })?)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[tokio::test]
    async fn test_create_job_invalid_expression() {
        assert!(create_job("not a cron", || async { Ok::<(), Error>(()) }).is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_job_runs() {
        let sched = JobScheduler::new().await.unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let job = create_job("* * * * * *", move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<(), Error>(())
            }
        })
        .unwrap();

        sched.add(job).await.unwrap();
        sched.start().await.unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(2500)).await;

        let mut sched = sched;
        sched.shutdown().await.unwrap();
        assert!(counter.load(Ordering::SeqCst) >= 1);
    }
}
