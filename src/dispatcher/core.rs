//! Dispatcher loop
//!
//! One [`Dispatcher`] serves any number of flow instances. For each instance
//! it repeatedly asks the [`FlowDriver`] what to start, runs the scheduled
//! nodes concurrently (cache first, queue on miss), records the outcomes and
//! then sleeps for the interval chosen by the retry strategy.

use super::selective::{always_run, RunDecision, SelectiveRun};
use super::tracer::{DispatcherTracer, LoggingTracer, NoopTracer, TraceEvent};
use super::traits::{FlowDriver, TaskQueue};
use super::types::{FlowReport, FlowState, NodeRequest, ResultSource, TaskOutcome};
use crate::cache::{CacheRegistry, ResultKey};
use crate::config::DispatcherConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::logging::log_retry_decision;
use crate::storage::{DataStorage, StorageError};
use crate::strategy::{NodeSnapshot, RetryStrategy, StrategyRegistry};
use futures::future::join_all;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

/// Result of a single dispatcher tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The driver reported the flow as finished
    Finished,
    /// Re-examine the flow after `interval`
    Retry {
        interval: Duration,
        nodes: NodeSnapshot,
    },
}

pub struct Dispatcher {
    config: Arc<DispatcherConfig>,
    strategy: RetryStrategy,
    cache: Arc<CacheRegistry>,
    storage: Arc<dyn DataStorage>,
    queue: Arc<dyn TaskQueue>,
    selective_run: Arc<dyn SelectiveRun>,
    tracer: Arc<dyn DispatcherTracer>,
    shutdown_requested: AtomicBool,
    shutdown_notify: Notify,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("strategy", &self.strategy)
            .field("cache", &self.cache)
            .field("storage", &self.storage)
            .field("shutdown_requested", &self.is_shutdown())
            .finish()
    }
}

impl Dispatcher {
    /// Build a dispatcher from validated configuration
    pub fn new(
        config: Arc<DispatcherConfig>,
        queue: Arc<dyn TaskQueue>,
        storage: Arc<dyn DataStorage>,
    ) -> DispatchResult<Self> {
        config.validate()?;
        let strategy = StrategyRegistry::with_builtins().resolve(&config.strategy)?;
        let cache: Arc<CacheRegistry> = Arc::new(CacheRegistry::from_config(&config.cache)?);
        let tracer: Arc<dyn DispatcherTracer> = if config.trace.enabled {
            Arc::new(LoggingTracer)
        } else {
            Arc::new(NoopTracer)
        };

        info!(
            predicates_module = %config.predicates_module,
            strategy = %strategy.kind(),
            storage = storage.adapter_name(),
            cache_enabled = cache.is_enabled(),
            "Dispatcher initialized"
        );

        Ok(Self {
            config,
            strategy,
            cache,
            storage,
            queue,
            selective_run: Arc::new(always_run),
            tracer,
            shutdown_requested: AtomicBool::new(false),
            shutdown_notify: Notify::new(),
        })
    }

    pub fn with_selective_run(mut self, selective_run: Arc<dyn SelectiveRun>) -> Self {
        self.selective_run = selective_run;
        self
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn DispatcherTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Share a cache registry between dispatchers
    pub fn with_cache(mut self, cache: Arc<CacheRegistry>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn strategy(&self) -> &RetryStrategy {
        &self.strategy
    }

    pub fn cache(&self) -> &Arc<CacheRegistry> {
        &self.cache
    }

    /// Stop every running flow at its next sleep
    pub fn shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Release);
        self.shutdown_notify.notify_waiters();
        info!("Dispatcher shutdown requested");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Drive a flow instance until the driver reports it finished
    ///
    /// Returns [`DispatchError::Shutdown`] when [`shutdown`](Self::shutdown) is
    /// called before the flow finishes.
    pub async fn run_flow(
        &self,
        driver: &dyn FlowDriver,
        flow_name: impl Into<String>,
        node_args: Value,
    ) -> DispatchResult<FlowReport> {
        let mut state = FlowState::new(flow_name, node_args);
        self.trace(TraceEvent::FlowStarted {
            flow_name: state.flow_name().to_string(),
        });

        loop {
            if self.is_shutdown() {
                return Err(self.interrupted(&state));
            }

            let interval = match self.tick(driver, &mut state).await? {
                TickOutcome::Finished => break,
                TickOutcome::Retry { interval, .. } => interval,
            };

            // registered before the flag check so a concurrent shutdown() cannot slip between them
            let notified = self.shutdown_notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_shutdown() {
                return Err(self.interrupted(&state));
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {},
                _ = &mut notified => {
                    debug!(flow_name = %state.flow_name(), "Shutdown notification received");
                    return Err(self.interrupted(&state));
                }
            }
        }

        self.trace(TraceEvent::FlowFinished {
            flow_name: state.flow_name().to_string(),
            ticks: state.ticks(),
        });
        info!(
            flow_name = %state.flow_name(),
            ticks = state.ticks(),
            completed = state.completed_count(),
            failed = state.failed_nodes().len(),
            "Flow finished"
        );
        Ok(state.into_report())
    }

    /// Run one scheduling round for `state`
    pub async fn tick(
        &self,
        driver: &dyn FlowDriver,
        state: &mut FlowState,
    ) -> DispatchResult<TickOutcome> {
        state.begin_tick();
        let schedule = driver.schedule(state);
        if schedule.finished {
            return Ok(TickOutcome::Finished);
        }

        let flow_name = state.flow_name().to_string();
        let outcomes = join_all(
            schedule
                .nodes
                .iter()
                .map(|node| self.handle_node(&flow_name, node)),
        )
        .await;

        let mut nodes = NodeSnapshot::new().with_active(schedule.waiting);
        for (node, outcome) in schedule.nodes.iter().zip(outcomes) {
            let outcome = outcome?;
            if node.fallback {
                nodes.fallback_started.push(node.node_name.clone());
            } else {
                nodes.started.push(node.node_name.clone());
            }
            state.record(node, outcome);
        }
        nodes.failed = state.failed_nodes();

        let previous = state.retry().previous_retry;
        let interval = state.retry_mut().advance(&self.strategy, &nodes);
        log_retry_decision(
            &flow_name,
            self.strategy.kind().as_str(),
            previous,
            interval,
            &nodes,
        );
        self.trace(TraceEvent::RetryScheduled {
            flow_name,
            retry: interval,
            progress: nodes.has_progress(),
        });

        Ok(TickOutcome::Retry { interval, nodes })
    }

    async fn handle_node(&self, flow_name: &str, node: &NodeRequest) -> DispatchResult<TaskOutcome> {
        self.trace(TraceEvent::TaskScheduled {
            flow_name: flow_name.to_string(),
            task_name: node.task_name.clone(),
            task_id: node.task_id.clone(),
            fallback: node.fallback,
        });

        match self
            .selective_run
            .decide(flow_name, &node.task_name, &node.node_args)
        {
            RunDecision::Reuse => {
                let result = self
                    .fetch_result(flow_name, &node.task_name, &node.task_id)
                    .await?;
                self.trace(TraceEvent::ResultReused {
                    flow_name: flow_name.to_string(),
                    task_name: node.task_name.clone(),
                    task_id: node.task_id.clone(),
                });
                Ok(TaskOutcome::Completed {
                    result,
                    source: ResultSource::Reused,
                })
            }
            RunDecision::Run(overrides) if overrides.is_empty() => {
                self.run_task(flow_name, node).await
            }
            RunDecision::Run(overrides) => {
                let node = NodeRequest {
                    node_args: RunDecision::apply(&overrides, &node.node_args),
                    ..node.clone()
                };
                self.run_task(flow_name, &node).await
            }
        }
    }

    /// Run one task, serving it from the result cache when possible
    ///
    /// A fresh result is written to storage and then to the cache. A task
    /// failure is stored with `store_error` and reported as
    /// [`TaskOutcome::Failed`]; storage errors abort with an error.
    pub async fn run_task(
        &self,
        flow_name: &str,
        request: &NodeRequest,
    ) -> DispatchResult<TaskOutcome> {
        let key = request.result_key(flow_name);
        if let Ok(result) = self.cache.get(&key) {
            self.trace(TraceEvent::CacheHit {
                flow_name: flow_name.to_string(),
                task_name: request.task_name.clone(),
                task_id: request.task_id.clone(),
            });
            return Ok(TaskOutcome::Completed {
                result,
                source: ResultSource::Cached,
            });
        }
        self.trace(TraceEvent::CacheMiss {
            flow_name: flow_name.to_string(),
            task_name: request.task_name.clone(),
            task_id: request.task_id.clone(),
        });

        match self.queue.dispatch(flow_name, request).await {
            Ok(result) => {
                self.storage
                    .store(
                        &request.node_args,
                        flow_name,
                        &request.task_name,
                        &request.task_id,
                        &result,
                    )
                    .await?;
                self.cache.add(key, result.clone());
                self.trace(TraceEvent::TaskCompleted {
                    flow_name: flow_name.to_string(),
                    task_name: request.task_name.clone(),
                    task_id: request.task_id.clone(),
                });
                Ok(TaskOutcome::Completed {
                    result,
                    source: ResultSource::Executed,
                })
            }
            Err(failure) => {
                error!(
                    flow_name = %flow_name,
                    task_name = %request.task_name,
                    task_id = %request.task_id,
                    reason = %failure.reason,
                    retryable = failure.retryable,
                    "Task failed"
                );
                self.trace(TraceEvent::TaskFailed {
                    flow_name: flow_name.to_string(),
                    task_name: request.task_name.clone(),
                    task_id: request.task_id.clone(),
                    reason: failure.reason.clone(),
                });

                match self
                    .storage
                    .store_error(
                        &request.node_args,
                        flow_name,
                        &request.task_name,
                        &request.task_id,
                        &failure,
                    )
                    .await
                {
                    Ok(()) => {}
                    Err(StorageError::Unsupported { adapter, .. }) => {
                        warn!(adapter = %adapter, task_name = %request.task_name, "Storage cannot record task failures");
                    }
                    Err(e) => return Err(e.into()),
                }
                Ok(TaskOutcome::Failed(failure))
            }
        }
    }

    /// Result of an already executed task, from the cache or from storage
    ///
    /// A storage hit is added to the cache.
    pub async fn fetch_result(
        &self,
        flow_name: &str,
        task_name: &str,
        task_id: &str,
    ) -> DispatchResult<Value> {
        let key = ResultKey::new(flow_name, task_name, task_id);
        if let Ok(result) = self.cache.get(&key) {
            return Ok(result);
        }

        let result = self.storage.retrieve(flow_name, task_name, task_id).await?;
        self.cache.add(key, result.clone());
        Ok(result)
    }

    fn trace(&self, event: TraceEvent) {
        self.tracer.trace(&event);
    }

    fn interrupted(&self, state: &FlowState) -> DispatchError {
        self.trace(TraceEvent::FlowInterrupted {
            flow_name: state.flow_name().to_string(),
        });
        warn!(flow_name = %state.flow_name(), ticks = state.ticks(), "Flow interrupted by shutdown");
        DispatchError::Shutdown {
            flow_name: state.flow_name().to_string(),
        }
    }
}
