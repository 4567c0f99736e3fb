//! Connecting across runs through a shared state directory

use common::remote::{MemoryConnector, MemoryNamespace};
use common::servers::DEFAULT_SERVER;
use zkview::{AppState, SessionManager};

fn connector() -> Box<MemoryConnector> {
    Box::new(
        MemoryConnector::new()
            .with_namespace("zk1:2181", MemoryNamespace::sample())
            .with_namespace("zk2:2182", MemoryNamespace::new())
            .with_namespace(DEFAULT_SERVER, MemoryNamespace::new()),
    )
}

#[tokio::test]
async fn test_recent_servers_survive_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    AppState::init(Some(root.clone()), None).unwrap();

    let mut first = SessionManager::new(AppState::load(Some(root.clone())).unwrap(), connector());
    first.connect(Some("zk1")).await.unwrap();
    first.connect(Some("zk2:2182")).await.unwrap();

    let second = SessionManager::new(AppState::load(Some(root.clone())).unwrap(), connector());
    assert_eq!(
        second.servers().entries(),
        &["zk2:2182", "zk1:2181", DEFAULT_SERVER]
    );
    assert_eq!(second.default_address(), "zk2:2182");
}

#[tokio::test]
async fn test_first_run_connects_to_default_server() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::load(Some(dir.path().to_path_buf())).unwrap();

    let mut session = SessionManager::new(state, connector());
    let first = session.connect(None).await.unwrap();

    assert_eq!(first, None);
    assert_eq!(session.explorer().address(), Some(DEFAULT_SERVER));
}
