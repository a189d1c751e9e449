//! River-authority portals.
//!
//! Cameras operated by the four flood-control offices are not playable through
//! the generic viewer. Each office hosts its own CCTV page, addressed by
//! record fields under office-specific parameter names.

use url::form_urlencoded;

use crate::config::UNDEFINED_SENTINEL;
use crate::models::{ProviderField, RawProviderRecord};

/// One flood-control office and how to address its CCTV page.
#[derive(Debug)]
pub(crate) struct RiverAuthority {
    /// Substring of `CENTERNAME` identifying the office
    pub keyword: &'static str,
    page_url: &'static str,
    /// Query parameters in emission order
    params: &'static [(&'static str, ProviderField)],
}

pub(crate) const RIVER_AUTHORITIES: &[RiverAuthority] = &[
    RiverAuthority {
        keyword: "한강",
        page_url: "https://www.hrfco.go.kr/sumun/cctvPopup.do",
        params: &[("Obscd", ProviderField::AuxId)],
    },
    RiverAuthority {
        keyword: "낙동강",
        page_url: "https://www.nakdongriver.go.kr/sumun/popup/cctvView.do",
        params: &[("cctvId", ProviderField::AuxId)],
    },
    RiverAuthority {
        keyword: "금강",
        page_url: "https://www.geumriver.go.kr/html/sumun/cctvView.jsp",
        params: &[("obscd", ProviderField::Password), ("cctvNo", ProviderField::AuxId)],
    },
    RiverAuthority {
        keyword: "영산강",
        page_url: "https://www.yeongsanriver.go.kr/sumun/videoDetail.do",
        params: &[("cctvIp", ProviderField::CctvIp)],
    },
];

impl RiverAuthority {
    /// Office operating the camera, matched on its center name.
    pub fn for_record(raw: &RawProviderRecord) -> Option<&'static RiverAuthority> {
        let center = raw.get(ProviderField::CenterName)?;
        RIVER_AUTHORITIES
            .iter()
            .find(|authority| center.contains(authority.keyword))
    }

    /// The office's CCTV page for this record.
    ///
    /// Missing fields are sent as `undefined`, as with the generic viewer.
    pub fn page_url(&self, raw: &RawProviderRecord) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (name, field) in self.params {
            let value = raw.get(*field);
            query.append_pair(name, value.as_deref().unwrap_or(UNDEFINED_SENTINEL));
        }
        format!("{}?{}", self.page_url, query.finish())
    }
}
