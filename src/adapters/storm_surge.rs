use super::UpstreamClient;
use crate::core::fetcher::RequestContext;
use crate::core::scoring::StormSurgeLookup;
use crate::utils::error::Result;
use serde::de::IgnoredAny;

/// Cached in place of a 404 so uncovered municipalities also honour the TTL.
const NOT_COVERED_BODY: &[u8] = b"null";

pub fn storm_surge_url(base_url: &str, kommunenummer: &str) -> String {
    format!("{}/{}.json", base_url.trim_end_matches('/'), kommunenummer)
}

/// Only the number of published scenarios matters; their contents are skipped.
fn scenario_count(scenarios: Option<Vec<IgnoredAny>>) -> Option<usize> {
    scenarios.map(|s| s.len())
}

impl UpstreamClient {
    /// Number of consequence scenarios for the municipality. `Ok(None)` means upstream
    /// has no entry, which is the normal answer for inland municipalities.
    pub async fn storm_surge(&self, kommunenummer: &str, ctx: RequestContext) -> Result<Option<usize>> {
        let url = storm_surge_url(&self.endpoints.storm_surge_url, kommunenummer);
        match self.fetcher.get_json(&url, self.ttls.storm_surge, ctx).await {
            Ok(scenarios) => Ok(scenario_count(scenarios)),
            Err(e) if e.is_not_found() => {
                self.fetcher
                    .remember(&url, NOT_COVERED_BODY.to_vec(), self.ttls.storm_surge);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn storm_surge_lookup(&self, kommunenummer: &str, ctx: RequestContext) -> StormSurgeLookup {
        match self.storm_surge(kommunenummer, ctx).await {
            Ok(Some(count)) => StormSurgeLookup::Scenarios(count),
            Ok(None) => {
                tracing::debug!("No storm surge data for municipality {}", kommunenummer);
                StormSurgeLookup::NotCovered
            }
            Err(e) => {
                tracing::warn!("Storm surge lookup failed for {}: {}", kommunenummer, e);
                StormSurgeLookup::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(body: &[u8]) -> Option<usize> {
        scenario_count(serde_json::from_slice(body).unwrap())
    }

    #[test]
    fn test_url() {
        assert_eq!(
            storm_surge_url("https://host/api/v1/", "1804"),
            "https://host/api/v1/1804.json"
        );
    }

    #[test]
    fn test_counts_scenarios_of_any_shape() {
        assert_eq!(
            count(
                br#"[{"kommunenummer":"1804","code":"S20","year":"2020","bygning_total":12},
                     {"kommunenummer":"1804","code":"S200","year":2090,"bygning_total":null}]"#
            ),
            Some(2)
        );
        assert_eq!(count(b"[]"), Some(0));
    }

    #[test]
    fn test_not_covered_marker_decodes_to_none() {
        assert_eq!(count(NOT_COVERED_BODY), None);
    }
}
