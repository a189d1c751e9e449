//! Built-in cameras served when the directory has never been fetched.

use crate::models::CameraRecord;

const SEED: &[(&str, &str, &str, f64, f64)] = &[
    ("L933113", "강원 강릉 용강동", "KBS 재난포털", 37.7519, 128.8760),
    ("L933103", "강원 강릉 주문진방파제", "KBS 재난포털", 37.8944, 128.8186),
    ("L933094", "강원 속초 등대전망대", "KBS 재난포털", 38.2070, 128.5918),
    ("L933073", "서울 마포 성산교", "KBS 재난포털", 37.5665, 126.9780),
    ("L933075", "부산 동래 세병교", "KBS 재난포털", 35.2048, 129.0837),
    ("E911789", "서해안선 목감IC", "국가교통정보센터", 37.2636, 126.8226),
    ("E620034", "공주시 국재교", "금강홍수통제소", 36.4606, 127.1089),
    ("L260003", "김해 빙그레삼거리", "김해교통정보센터", 35.2281, 128.8890),
];

/// Known-good cameras used as a last-resort directory.
pub fn seed_cameras() -> Vec<CameraRecord> {
    SEED.iter()
        .map(|&(id, name, center, lat, lng)| CameraRecord {
            id: id.to_string(),
            name: name.to_string(),
            center: center.to_string(),
            lat,
            lng,
        })
        .collect()
}
