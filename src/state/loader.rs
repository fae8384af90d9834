use crate::state::messages::{DataRequest, DataResponse};
use log::{debug, error, info};
use padel_core::source::{DataError, DataSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Reads the association snapshot off the UI task.
pub struct LoaderWorker {
    source: DataSource,
    requests: mpsc::Receiver<DataRequest>,
    responses: mpsc::Sender<DataResponse>,
    is_loading: Arc<AtomicBool>,
    last_modified: Option<SystemTime>,
}

impl LoaderWorker {
    pub fn new(
        source: DataSource,
        requests: mpsc::Receiver<DataRequest>,
        responses: mpsc::Sender<DataResponse>,
    ) -> Self {
        Self {
            source,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
            last_modified: None,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            if matches!(request, DataRequest::Refresh) && !self.snapshot_changed().await {
                if self.responses.send(DataResponse::Unchanged).await.is_err() {
                    break;
                }
                continue;
            }

            self.start_loading_animation().await;
            let result = self.handle_load().await;
            debug!("snapshot request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| DataResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send loader response: {e}");
                break;
            }
        }
    }

    async fn snapshot_changed(&self) -> bool {
        let modified = self.source.modified().await;
        modified.is_some() && modified != self.last_modified
    }

    async fn handle_load(&mut self) -> Result<DataResponse, DataError> {
        debug!("loading snapshot from {}", self.source.describe());
        let modified = self.source.modified().await;
        let association = self.source.load().await?;
        if self.last_modified.is_some() && modified != self.last_modified {
            info!("snapshot changed on disk, reloaded");
        }
        self.last_modified = modified;
        Ok(DataResponse::Loaded {
            association: Box::new(association),
            source: self.source.describe(),
        })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(DataResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(DataResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(DataResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn next_outcome(rx: &mut mpsc::Receiver<DataResponse>) -> Option<DataResponse> {
        while let Some(resp) = rx.recv().await {
            if !matches!(resp, DataResponse::LoadingStateChanged { .. }) {
                return Some(resp);
            }
        }
        None
    }

    #[tokio::test]
    async fn test_load_then_refresh_embedded() {
        let (req_tx, req_rx) = mpsc::channel(8);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        let worker = LoaderWorker::new(DataSource::embedded(), req_rx, resp_tx);
        let task = tokio::spawn(worker.run());

        req_tx.send(DataRequest::Load).await.unwrap();
        match next_outcome(&mut resp_rx).await {
            Some(DataResponse::Loaded { association, source }) => {
                assert!(!association.tournaments.is_empty());
                assert_eq!(source, "built-in snapshot");
            }
            other => panic!("expected a loaded snapshot, got {other:?}"),
        }

        // The built-in snapshot never changes.
        req_tx.send(DataRequest::Refresh).await.unwrap();
        assert!(matches!(next_outcome(&mut resp_rx).await, Some(DataResponse::Unchanged)));
        task.abort();
    }

    const FIXTURE: &str = include_str!("../../core/fixtures/association.json");

    fn write_snapshot(path: &std::path::Path, content: &str, modified: SystemTime) {
        std::fs::write(path, content).unwrap();
        std::fs::File::options().write(true).open(path).unwrap().set_modified(modified).unwrap();
    }

    #[tokio::test]
    async fn test_refresh_follows_file_modification_time() {
        let path = std::env::temp_dir()
            .join(format!("padeltui-refresh-{}.json", std::process::id()));
        let start = SystemTime::now();
        write_snapshot(&path, FIXTURE, start);

        let (req_tx, req_rx) = mpsc::channel(8);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        let source = DataSource::new(Some(path.clone()));
        let task = tokio::spawn(LoaderWorker::new(source, req_rx, resp_tx).run());

        req_tx.send(DataRequest::Load).await.unwrap();
        assert!(matches!(next_outcome(&mut resp_rx).await, Some(DataResponse::Loaded { .. })));

        // Same file, same mtime: nothing to do.
        req_tx.send(DataRequest::Refresh).await.unwrap();
        assert!(matches!(next_outcome(&mut resp_rx).await, Some(DataResponse::Unchanged)));

        let renamed = FIXTURE.replace("Club de Pádel Los Álamos", "Club Renamed");
        write_snapshot(&path, &renamed, start + Duration::from_secs(10));
        req_tx.send(DataRequest::Refresh).await.unwrap();
        match next_outcome(&mut resp_rx).await {
            Some(DataResponse::Loaded { association, .. }) => {
                assert_eq!(association.name, "Club Renamed");
            }
            other => panic!("expected a reload, got {other:?}"),
        }

        write_snapshot(&path, "{ not json", start + Duration::from_secs(20));
        req_tx.send(DataRequest::Refresh).await.unwrap();
        match next_outcome(&mut resp_rx).await {
            Some(DataResponse::Error { message }) => assert!(message.contains("json")),
            other => panic!("expected a parse error, got {other:?}"),
        }

        task.abort();
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_missing_file_reports_error() {
        let (req_tx, req_rx) = mpsc::channel(8);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        let source = DataSource::new(Some("/no/such/snapshot.json".into()));
        let task = tokio::spawn(LoaderWorker::new(source, req_rx, resp_tx).run());

        req_tx.send(DataRequest::Load).await.unwrap();
        match next_outcome(&mut resp_rx).await {
            Some(DataResponse::Error { message }) => assert!(message.contains("snapshot.json")),
            other => panic!("expected an error, got {other:?}"),
        }
        task.abort();
    }
}
