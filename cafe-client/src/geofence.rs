//! 地理围栏准入
//!
//! ```text
//! loading ──▶ not_configured
//!    │
//!    └──▶ prompt ──(用户同意)──▶ checking ──▶ granted ◀──┐
//!                                  │                │     │ 每 5 分钟静默复查
//!                                  │                └─────┘
//!                                  ├──▶ out_of_range (停止复查，需手动重试)
//!                                  ├──▶ denied (需在系统中重置定位权限)
//!                                  └──▶ error (超时 / 其他失败，可重试)
//! ```
//!
//! 一切异常都关闭准入：未配置围栏、无法定位、复查失败都不会放行。
//! 复查任务由 [`CancellationToken`] 持有，离开 granted、`close()` 或 drop 时取消；
//! `close()` 同时撤销准入，回到 prompt。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared::geo::Coordinate;
use shared::models::{Geofence, VenueInfo};
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Gate timing
#[derive(Debug, Clone, Copy)]
pub struct GateConfig {
    /// 授权后静默复查间隔
    pub recheck_interval: Duration,
    /// 单次定位超时
    pub acquisition_timeout: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            recheck_interval: Duration::from_secs(5 * 60),
            acquisition_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GateStatus {
    Loading,
    NotConfigured,
    Prompt,
    Checking,
    Granted { distance_m: f64, radius_m: f64 },
    Denied,
    OutOfRange { distance_m: f64, radius_m: f64 },
    Error { message: String },
}

/// Request sent to the platform location service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// Oldest cached fix the provider may return
    pub maximum_age: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location request timed out")]
    Timeout,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Platform location service
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<Coordinate, LocationError>;
}

const TIMEOUT_MESSAGE: &str = "Timed out finding your location. Check that GPS is enabled and try again.";
const UNAVAILABLE_MESSAGE: &str = "Could not determine your location. Please try again.";

struct GateInner {
    provider: Arc<dyn LocationProvider>,
    config: GateConfig,
    fence: Mutex<Option<Geofence>>,
    status: watch::Sender<GateStatus>,
    recheck: Mutex<Option<CancellationToken>>,
}

pub struct GeofenceGate {
    inner: Arc<GateInner>,
}

impl std::fmt::Debug for GeofenceGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeofenceGate")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl GeofenceGate {
    pub fn new(provider: Arc<dyn LocationProvider>, config: GateConfig) -> Self {
        let (status, _) = watch::channel(GateStatus::Loading);
        Self {
            inner: Arc::new(GateInner {
                provider,
                config,
                fence: Mutex::new(None),
                status,
                recheck: Mutex::new(None),
            }),
        }
    }

    pub fn status(&self) -> GateStatus {
        self.inner.status.borrow().clone()
    }

    /// Status updates for the UI
    pub fn subscribe(&self) -> watch::Receiver<GateStatus> {
        self.inner.status.subscribe()
    }

    pub fn is_granted(&self) -> bool {
        matches!(*self.inner.status.borrow(), GateStatus::Granted { .. })
    }

    /// Whether the background re-verification is scheduled
    pub fn is_rechecking(&self) -> bool {
        self.inner
            .recheck
            .lock()
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Apply the venue configuration: `prompt` when a boundary exists,
    /// `not_configured` otherwise
    pub fn configure(&self, venue: &VenueInfo) -> GateStatus {
        let fence = venue.geofence();
        let status = match fence {
            Some(_) => GateStatus::Prompt,
            None => {
                tracing::warn!(venue = %venue.name, "Venue has no geofence, ordering is blocked");
                GateStatus::NotConfigured
            }
        };

        let mut recheck = self.inner.recheck.lock();
        if let Some(token) = recheck.take() {
            token.cancel();
        }
        *self.inner.fence.lock() = fence;
        self.inner.set(status.clone());
        status
    }

    /// Measure the device position after explicit user consent
    ///
    /// Also the retry action from `out_of_range`, `error` and `denied`. Does
    /// nothing while `loading`, `not_configured`, `checking` or `granted`.
    pub async fn request_access(&self) -> GateStatus {
        let Some(fence) = self.inner.begin_check() else {
            return self.status();
        };
        let status = self.inner.measure(&fence).await;
        GateInner::finish_check(&self.inner, fence, status)
    }

    /// Alias of [`request_access`](Self::request_access) for retry buttons
    pub async fn retry(&self) -> GateStatus {
        self.request_access().await
    }

    /// Stop re-verification and revoke access (navigation away, session end)
    ///
    /// 关闭后回到 prompt，再次下单前必须重新定位。
    pub fn close(&self) {
        self.inner.close();
    }
}

impl Drop for GeofenceGate {
    fn drop(&mut self) {
        self.inner.close();
    }
}

// 所有状态发布都持有 `recheck` 锁，configure / close 与测量结果互斥。
impl GateInner {
    fn set(&self, status: GateStatus) {
        self.status.send_replace(status);
    }

    fn close(&self) {
        let mut recheck = self.recheck.lock();
        if let Some(token) = recheck.take() {
            token.cancel();
        }
        self.status.send_if_modified(|status| match status {
            GateStatus::Granted { .. } | GateStatus::Checking => {
                *status = GateStatus::Prompt;
                true
            }
            _ => false,
        });
    }

    /// Enter `checking` if a fence exists and the current status allows it
    fn begin_check(&self) -> Option<Geofence> {
        let _recheck = self.recheck.lock();
        let fence = (*self.fence.lock())?;
        let mut checking = false;
        self.status.send_if_modified(|status| match status {
            GateStatus::Prompt
            | GateStatus::OutOfRange { .. }
            | GateStatus::Denied
            | GateStatus::Error { .. } => {
                *status = GateStatus::Checking;
                checking = true;
                true
            }
            _ => false,
        });
        checking.then_some(fence)
    }

    /// Publish the result of a consented measurement
    ///
    /// Discarded when the gate was reconfigured or closed while measuring.
    fn finish_check(inner: &Arc<Self>, fence: Geofence, status: GateStatus) -> GateStatus {
        let mut recheck = inner.recheck.lock();
        let unchanged = *inner.fence.lock() == Some(fence)
            && matches!(*inner.status.borrow(), GateStatus::Checking);
        if !unchanged {
            tracing::debug!(?status, "Gate changed while measuring, result discarded");
            return inner.status.borrow().clone();
        }

        inner.set(status.clone());
        if matches!(status, GateStatus::Granted { .. }) {
            let token = CancellationToken::new();
            if let Some(previous) = recheck.replace(token.clone()) {
                previous.cancel();
            }
            Self::spawn_recheck(inner, fence, token);
        }
        status
    }

    async fn measure(&self, fence: &Geofence) -> GateStatus {
        let options = PositionOptions {
            high_accuracy: true,
            maximum_age: Duration::ZERO,
            timeout: self.config.acquisition_timeout,
        };
        let position = match tokio::time::timeout(
            self.config.acquisition_timeout,
            self.provider.current_position(options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout),
        };

        match position {
            Ok(position) => {
                let distance_m = fence.center.distance_to(&position);
                if distance_m <= fence.radius_m {
                    GateStatus::Granted {
                        distance_m,
                        radius_m: fence.radius_m,
                    }
                } else {
                    GateStatus::OutOfRange {
                        distance_m,
                        radius_m: fence.radius_m,
                    }
                }
            }
            Err(LocationError::PermissionDenied) => GateStatus::Denied,
            Err(LocationError::Timeout) => GateStatus::Error {
                message: TIMEOUT_MESSAGE.to_string(),
            },
            Err(e) => {
                tracing::debug!(error = %e, "Location acquisition failed");
                GateStatus::Error {
                    message: UNAVAILABLE_MESSAGE.to_string(),
                }
            }
        }
    }

    fn spawn_recheck(inner: &Arc<Self>, fence: Geofence, token: CancellationToken) {
        let gate = Arc::clone(inner);
        tokio::spawn(async move {
            let period = gate.config.recheck_interval;
            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(period) => {}
                }

                let status = tokio::select! {
                    _ = token.cancelled() => return,
                    status = gate.measure(&fence) => status,
                };
                let still_granted = {
                    let _recheck = gate.recheck.lock();
                    if token.is_cancelled() {
                        return;
                    }
                    let still_granted = matches!(status, GateStatus::Granted { .. });
                    if !still_granted {
                        tracing::info!(?status, "Geofence re-check failed, closing access");
                        token.cancel();
                    }
                    gate.set(status);
                    still_granted
                };
                if !still_granted {
                    return;
                }
            }
        });
    }
}
