//! Remote point-elevation query service.
//!
//! Issues one GET per point of the form
//! `{base}?x={lon}&y={lat}&units=Meters&output=json` and reads the
//! elevation out of the JSON body.

use super::{ElevationSource, HttpClient, ReqwestClient};
use crate::TerrainError;
use geo::geometry::Coord;
use log::warn;
use serde_json::Value;
use std::time::Duration;

/// USGS Elevation Point Query Service.
pub const DEFAULT_BASE_URL: &str = "https://nationalmap.gov/epqs/pqs.php";

/// Where the elevation lives in the service's response.
pub const DEFAULT_POINTER: &str = "/USGS_Elevation_Point_Query_Service/Elevation_Query/Elevation";

/// The service reports points it has no data for as -1000000.
const NO_DATA_THRESHOLD: f64 = -1_000_000.0;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Elevation from a remote point-query service.
pub struct PointQuerySource<H = ReqwestClient> {
    client: H,
    base_url: String,
    /// JSON pointer (RFC 6901) to the elevation field.
    pointer: String,
}

impl PointQuerySource {
    pub fn builder() -> PointQuerySourceBuilder {
        PointQuerySourceBuilder {
            base_url: DEFAULT_BASE_URL.to_owned(),
            pointer: DEFAULT_POINTER.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl<H: HttpClient> PointQuerySource<H> {
    pub fn query_url(&self, coord: Coord<f64>) -> String {
        let sep = if self.base_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{sep}x={}&y={}&units=Meters&output=json",
            self.base_url, coord.x, coord.y
        )
    }
}

impl<H: HttpClient> ElevationSource for PointQuerySource<H> {
    fn resolve(&self, coord: Coord<f64>) -> Option<f64> {
        let url = self.query_url(coord);
        let body = self
            .client
            .get(&url)
            .map_err(|e| warn!("point query: {e}"))
            .ok()?;
        let elevation = parse_elevation(&body, &self.pointer);
        if elevation.is_none() {
            warn!("point query: no elevation in response from {url}");
        }
        elevation
    }

    fn name(&self) -> &str {
        "query"
    }
}

/// Extracts the elevation at `pointer` from a JSON response body.
///
/// The field may be a JSON number or a numeric string. Returns `None`
/// for malformed bodies, a missing field, non-numeric values, and the
/// service's no-data marker.
pub fn parse_elevation(body: &[u8], pointer: &str) -> Option<f64> {
    let json: Value = serde_json::from_slice(body).ok()?;
    let elevation = match json.pointer(pointer)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (elevation.is_finite() && elevation > NO_DATA_THRESHOLD).then_some(elevation)
}

pub struct PointQuerySourceBuilder {
    base_url: String,
    pointer: String,
    timeout: Duration,
}

impl PointQuerySourceBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// JSON pointer to the elevation field, e.g. `/value`.
    pub fn pointer(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = pointer.into();
        self
    }

    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<PointQuerySource, TerrainError> {
        let client = ReqwestClient::with_timeout(self.timeout)?;
        self.build_with_client(client)
    }

    pub fn build_with_client<H: HttpClient>(self, client: H) -> Result<PointQuerySource<H>, TerrainError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(TerrainError::Config(format!(
                "query URL {:?} is not http(s)",
                self.base_url
            )));
        }
        if !(self.pointer.is_empty() || self.pointer.starts_with('/')) {
            return Err(TerrainError::Config(format!(
                "JSON pointer {:?} must start with '/'",
                self.pointer
            )));
        }
        Ok(PointQuerySource {
            client,
            base_url: self.base_url,
            pointer: self.pointer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_elevation, Coord, ElevationSource, PointQuerySource, DEFAULT_POINTER};
    use crate::{
        elevation::{MockHttpClient, TimeoutHttpClient},
        TerrainError,
    };

    const BASE: &str = "http://query.test/epqs";
    const POINT: Coord = Coord { x: -80.0, y: 8.5 };

    fn epqs_body(elevation: &str) -> String {
        format!(
            r#"{{"USGS_Elevation_Point_Query_Service":{{"Elevation_Query":{{"x":-80.0,"y":8.5,"Data_Source":"3DEP","Elevation":{elevation},"Units":"Meters"}}}}}}"#
        )
    }

    #[test]
    fn test_parse_elevation() {
        assert_eq!(
            parse_elevation(epqs_body("123.25").as_bytes(), DEFAULT_POINTER),
            Some(123.25)
        );
        assert_eq!(
            parse_elevation(epqs_body(r#""-4.5""#).as_bytes(), DEFAULT_POINTER),
            Some(-4.5)
        );
        assert_eq!(
            parse_elevation(br#"{"value":"88.1"}"#, "/value"),
            Some(88.1)
        );
    }

    #[test]
    fn test_parse_elevation_rejects() {
        // Service no-data marker.
        assert_eq!(
            parse_elevation(epqs_body("-1000000").as_bytes(), DEFAULT_POINTER),
            None
        );
        // Missing field.
        assert_eq!(parse_elevation(br#"{"value":1.0}"#, DEFAULT_POINTER), None);
        // Not JSON.
        assert_eq!(parse_elevation(b"<html>busy</html>", DEFAULT_POINTER), None);
        // Wrong type.
        assert_eq!(parse_elevation(br#"{"value":null}"#, "/value"), None);
        assert_eq!(parse_elevation(br#"{"value":"n/a"}"#, "/value"), None);
    }

    #[test]
    fn test_query_url() {
        let source = PointQuerySource::builder()
            .base_url(BASE)
            .build_with_client(MockHttpClient::default())
            .unwrap();
        assert_eq!(
            source.query_url(POINT),
            "http://query.test/epqs?x=-80&y=8.5&units=Meters&output=json"
        );

        let source = PointQuerySource::builder()
            .base_url("http://query.test/epqs?wkid=4326")
            .build_with_client(MockHttpClient::default())
            .unwrap();
        assert!(source
            .query_url(POINT)
            .starts_with("http://query.test/epqs?wkid=4326&x=-80"));
    }

    #[test]
    fn test_resolve() {
        let client = MockHttpClient::default().with(
            "http://query.test/epqs?x=-80&y=8.5&units=Meters&output=json",
            epqs_body("57.5"),
        );
        let source = PointQuerySource::builder()
            .base_url(BASE)
            .build_with_client(client)
            .unwrap();
        assert_eq!(source.resolve(POINT), Some(57.5));
        // Unregistered URL 404s.
        assert_eq!(source.resolve(Coord { x: -80.0, y: 9.0 }), None);
    }

    #[test]
    fn test_timeout_is_no_data() {
        let source = PointQuerySource::builder()
            .base_url(BASE)
            .build_with_client(TimeoutHttpClient::default())
            .unwrap();
        assert_eq!(source.resolve(POINT), None);
    }

    #[test]
    fn test_config_errors() {
        assert!(matches!(
            PointQuerySource::builder()
                .base_url("ftp://query.test")
                .build_with_client(MockHttpClient::default()),
            Err(TerrainError::Config(_))
        ));
        assert!(matches!(
            PointQuerySource::builder()
                .pointer("value")
                .build_with_client(MockHttpClient::default()),
            Err(TerrainError::Config(_))
        ));
    }
}
