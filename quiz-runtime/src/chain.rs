//! Chain Orchestrator
//!
//! Runs hops strictly one after another:
//! - Stops when a reply carries no next URL (failed hops never do)
//! - Never starts a new hop once the time budget is spent; the first hop
//!   always runs and an in-flight hop may overrun
//! - Honors server pacing delays, capped at `max_delay`

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, info_span, warn, Instrument};

use quiz_core::{ChainOutcome, ChainRequest, HopResult, DEFAULT_BUDGET_SECS, MAX_DELAY_SECS};
use quiz_net::{FetchConfig, HttpFetcher};
use quiz_solver::Navigator;

/// Chain configuration
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// No hop starts after this much time has passed since chain start
    pub budget: Duration,
    /// Upper bound on a server-requested delay between hops
    pub max_delay: Duration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(DEFAULT_BUDGET_SECS),
            max_delay: Duration::from_secs(MAX_DELAY_SECS),
        }
    }
}

impl ChainConfig {
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Pause before the next hop for a server-requested delay in seconds
    pub fn pacing_delay(&self, delay_secs: f64) -> Duration {
        if !delay_secs.is_finite() || delay_secs <= 0.0 {
            Duration::ZERO
        } else if delay_secs >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(delay_secs)
        }
    }
}

/// Hops recorded so far, shared with whoever supervises the run
pub type HopLog = Arc<Mutex<Vec<HopResult>>>;

/// Runs one chain at a time with its own navigator
pub struct ChainRunner {
    navigator: Navigator,
    config: ChainConfig,
}

impl ChainRunner {
    pub fn new(navigator: Navigator, config: ChainConfig) -> Self {
        Self { navigator, config }
    }

    /// Run the chain until no next URL remains or the budget is spent
    pub async fn run(&self, request: &ChainRequest) -> ChainOutcome {
        self.run_logged(request, HopLog::default()).await
    }

    /// Like [`ChainRunner::run`], recording every hop into `log` as soon as
    /// it completes
    pub async fn run_logged(&self, request: &ChainRequest, log: HopLog) -> ChainOutcome {
        let run_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
        self.run_chain(request, &log)
            .instrument(info_span!("chain", run = %run_id))
            .await
    }

    async fn run_chain(&self, request: &ChainRequest, log: &HopLog) -> ChainOutcome {
        let start = Instant::now();
        let mut current_url = Some(request.start_url.trim().to_string()).filter(|u| !u.is_empty());

        info!("Chain starting at {:?}", current_url);

        while let Some(url) = current_url.take() {
            let recorded = log.lock().len();
            if recorded > 0 && start.elapsed() >= self.config.budget {
                warn!(
                    "Time budget of {:?} spent after {} hops, not starting {}",
                    self.config.budget, recorded, url
                );
                break;
            }

            let result = self
                .navigator
                .solve_hop(&request.caller_identity, &request.shared_secret, &url)
                .await;
            let next = result.next_hop();
            log.lock().push(result);

            current_url = next.next_url;
            if current_url.is_some() && next.delay_secs > 0.0 {
                let delay = self.config.pacing_delay(next.delay_secs);
                debug!("Server requested {}s delay, waiting {:?}", next.delay_secs, delay);
                sleep(delay).await;
            }
        }

        let hops = std::mem::take(&mut *log.lock());
        let outcome = ChainOutcome::completed(hops, start.elapsed().as_secs_f64());
        info!(
            "Chain finished: {} hops ({} failed) in {:.2}s",
            outcome.total_hops,
            outcome.failed_hops(),
            outcome.elapsed_secs
        );
        outcome
    }
}

/// Run a chain on its own task so that even a panic inside a hop yields
/// a well-formed outcome carrying the hops finished before it
pub async fn run_guarded(runner: ChainRunner, request: ChainRequest) -> ChainOutcome {
    let start = Instant::now();
    let log = HopLog::default();
    let task_log = log.clone();
    let handle = tokio::spawn(async move { runner.run_logged(&request, task_log).await });

    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => {
            let hops = std::mem::take(&mut *log.lock());
            error!("Chain run aborted after {} hops: {}", hops.len(), e);
            ChainOutcome::aborted(
                hops,
                format!("Chain run aborted: {e}"),
                start.elapsed().as_secs_f64(),
            )
        }
    }
}

/// Solve a quiz chain with a fresh HTTP session.
///
/// The caller verifies the shared secret beforehand; this never fails.
pub async fn solve_quiz_chain(
    request: ChainRequest,
    fetch_config: &FetchConfig,
    chain_config: ChainConfig,
) -> ChainOutcome {
    let start = Instant::now();
    let fetcher = match HttpFetcher::new(fetch_config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!("Cannot create HTTP session: {}", e);
            return ChainOutcome::aborted(Vec::new(), e, start.elapsed().as_secs_f64());
        }
    };

    let runner = ChainRunner::new(Navigator::new(Arc::new(fetcher)), chain_config);
    run_guarded(runner, request).await
}
