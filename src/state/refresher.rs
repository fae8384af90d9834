use crate::state::messages::DataRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Asks the loader to pick up snapshot edits made while the app is open.
/// Only sends `Refresh`; the full load happens once on startup.
pub struct PeriodicRefresher {
    data_requests: mpsc::Sender<DataRequest>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(data_requests: mpsc::Sender<DataRequest>, period: Duration) -> Self {
        Self { data_requests, period }
    }

    pub async fn run(self) {
        let mut refresh_interval = interval(self.period);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        refresh_interval.tick().await;

        loop {
            refresh_interval.tick().await;
            if self.data_requests.send(DataRequest::Refresh).await.is_err() {
                break;
            }
        }
    }
}
