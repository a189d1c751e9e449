// Shared test helpers: a mock provider and a service wired to it.

use std::path::Path;
use std::sync::Arc;

use cctv_proxy::directory::DirectoryStore;
use cctv_proxy::provider::{Provider, UticClient};
use cctv_proxy::{CctvService, Config};
use wiremock::MockServer;

pub const DIRECTORY_PATH: &str = "/excel/download/OpenDataCCTV";
#[allow(dead_code)]
pub const METADATA_PATH: &str = "/map/getCctvInfoById.do";
#[allow(dead_code)]
pub const SECONDARY_PATH: &str = "/map/getCctvVideoUrl.do";

/// CSV export with three cameras around Seoul and one in Gimhae.
#[allow(dead_code)] // Used by other test files
pub fn directory_export() -> String {
    [
        "CENTERNAME,CCTVID,CCTVNAME,XCOORD,YCOORD",
        "KBS 재난포털,L933073,서울 마포 성산교,126.9780,37.5665",
        "국가교통정보센터,E911789,서해안선 목감IC,126.8226,37.2636",
        "서울특별시,L010045,세종대로 시청앞,126.9770,37.5660",
        "김해교통정보센터,L260003,김해 빙그레삼거리,128.8890,35.2281",
    ]
    .join("\n")
}

/// Configuration pointing every provider endpoint at `server`.
pub fn config_for(server: &MockServer, snapshot_path: &Path) -> Config {
    Config {
        api_key: "integration-key".to_string(),
        snapshot_path: snapshot_path.to_path_buf(),
        directory_url: format!("{}{}", server.uri(), DIRECTORY_PATH),
        metadata_url: format!("{}{}", server.uri(), METADATA_PATH),
        secondary_url: format!("{}{}", server.uri(), SECONDARY_PATH),
        directory_timeout_secs: 5,
        metadata_timeout_secs: 5,
        secondary_timeout_secs: 5,
        relay_timeout_secs: 5,
        // The mock provider and media server listen on loopback
        relay_allow_private_targets: true,
        ..Default::default()
    }
}

/// Service over the real HTTP client, persisting to `snapshot_path`.
pub fn service_for(server: &MockServer, snapshot_path: &Path) -> Arc<CctvService> {
    let config = config_for(server, snapshot_path);
    let provider: Arc<dyn Provider> =
        Arc::new(UticClient::new(&config).expect("Failed to build provider client"));
    let store = DirectoryStore::new(config.snapshot_path.clone());
    Arc::new(
        CctvService::with_provider(&config, provider, store).expect("Failed to build service"),
    )
}
