use std::future::Future;

use tracing::{error, info, instrument};

use crate::{
    bot::{Bot, CycleOutcome},
    error::{BotError, LoopAction},
    measure::SpeedMeasurer,
    publish::StatusPoster,
};

/// Runs the bot forever, pausing `retry_time` from the bot's config between cycles.
pub struct Driver<M, P> {
    bot: Bot<M, P>,
}

impl<M, P> Driver<M, P>
where
    M: SpeedMeasurer,
    P: StatusPoster,
{
    pub fn new(bot: Bot<M, P>) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> &Bot<M, P> {
        &self.bot
    }

    pub async fn run_once(&self) -> Result<CycleOutcome, BotError> {
        self.bot.cycle().await
    }

    /// Cycles until `shutdown` resolves.
    ///
    /// Every cycle, failed or not, is followed by exactly one sleep of the
    /// retry time. Resolving `shutdown` stops the loop right away, even in
    /// the middle of a measurement.
    #[instrument(skip_all)]
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let retry_time = self.bot.config().retry_time;

        loop {
            let result = tokio::select! {
                result = self.bot.cycle() => result.map(|_| ()),
                _ = &mut shutdown => Err(BotError::Interrupted),
            };

            if let Err(e) = result {
                match e.action() {
                    LoopAction::Terminate => {
                        info!("{e}, stopping");
                        return;
                    }
                    LoopAction::ContinueAfterSleep => error!(
                        "Something went wrong, {e} re trying in {} seconds",
                        retry_time.as_secs()
                    ),
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(retry_time) => {}
                _ = &mut shutdown => {
                    info!("interrupted while waiting, stopping");
                    return;
                }
            }
        }
    }
}

/// Resolves on Ctrl-C. If the signal handler cannot be installed it never resolves.
pub async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("could not listen for interrupts: {e}");
        std::future::pending::<()>().await;
    }
}
