//! [SolisCloud](https://www.soliscloud.com) platform API client.

mod cache;
mod codec;
mod error;
mod models;
mod request;
mod signature;
mod station_data;
mod transport;

use std::sync::Arc;

use bon::bon;
use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Serialize, de::DeserializeOwned};

pub use self::{
    cache::{CacheKey, Outcome, QueryCache, SharedOutcome},
    codec::Codec,
    error::Error,
    models::{Inverter, InverterPower, StationPower, UserStation},
    request::{MONEY, Pagination, TIME_ZONE},
    signature::{Credentials, SignedRequest},
    station_data::{
        StationAllData,
        StationData,
        StationDataMap,
        StationDataPoint,
        StationPeriodData,
        StationTotals,
    },
    transport::{DEFAULT_BASE_URL, Transport},
};
use self::{
    models::{InverterDayData, ListData, StationDayData},
    request::{InverterDayRequest, InverterListRequest, StationRequest, UserStationListRequest},
    station_data::collect_station_data,
};
use crate::prelude::*;

/// SolisCloud client.
///
/// With `debug`, the exchanged payloads are logged at `INFO` instead of `TRACE`.
///
/// All-time, yearly and monthly station data is memoized per query for the lifetime of the
/// client, failures included. Daily data is always fetched.
pub struct Api {
    inner: Arc<Inner>,
    station_data: QueryCache<CacheKey, StationDataMap>,
}

#[bon]
impl Api {
    #[builder]
    pub fn new(
        #[builder(into)] key_id: String,
        #[builder(into)] key_secret: String,
        #[builder(default)] debug: bool,
        #[builder(into, default = DEFAULT_BASE_URL.to_owned())] base_url: String,
    ) -> Result<Self, Error> {
        let transport = Transport::try_new(Credentials::try_new(key_id, key_secret)?, &base_url)?;
        Ok(Self {
            inner: Arc::new(Inner { transport, codec: Codec { debug } }),
            station_data: QueryCache::default(),
        })
    }
}

impl Api {
    #[instrument(skip_all, fields(page_no = pagination.page_no, page_size = pagination.page_size))]
    pub async fn user_station_list(&self, pagination: Pagination) -> Result<Vec<UserStation>> {
        let data: ListData<UserStation> = self
            .inner
            .post("userStationList", &UserStationListRequest { pagination })
            .await
            .context("failed to list the stations")?;
        info!(n_stations = data.page.records.len(), "fetched");
        Ok(data.page.records)
    }

    /// List the stations as handles for further queries.
    pub async fn stations(&self, pagination: Pagination) -> Result<Vec<Station<'_>>> {
        Ok(self
            .user_station_list(pagination)
            .await?
            .into_iter()
            .map(|details| Station { api: self, details })
            .collect_vec())
    }

    #[instrument(
        skip_all,
        fields(page_no = pagination.page_no, page_size = pagination.page_size, station_id = station_id),
    )]
    pub async fn inverter_list(
        &self,
        pagination: Pagination,
        station_id: Option<&str>,
    ) -> Result<Vec<Inverter>> {
        let request = InverterListRequest { pagination, station_id: station_id.map(str::to_owned) };
        let data: ListData<Inverter> = self
            .inner
            .post("inverterList", &request)
            .await
            .context("failed to list the inverters")?;
        info!(n_inverters = data.page.records.len(), "fetched");
        Ok(data.page.records)
    }

    /// Yearly totals keyed by January 1st of each year.
    #[instrument(skip_all, fields(station_id = station_id))]
    pub async fn station_all(&self, station_id: &str) -> Result<Arc<StationDataMap>> {
        self.query_station_data(CacheKey::AllTime { station_id: station_id.to_owned() })
            .await
            .with_context(|| format!("failed to fetch all-time data of station `{station_id}`"))
    }

    /// Monthly totals of the year, keyed by the month start.
    #[instrument(skip_all, fields(station_id = station_id, year = year))]
    pub async fn station_year(&self, station_id: &str, year: i32) -> Result<Arc<StationDataMap>> {
        self.query_station_data(CacheKey::Year { station_id: station_id.to_owned(), year })
            .await
            .with_context(|| format!("failed to fetch {year} data of station `{station_id}`"))
    }

    /// Daily totals of the month, keyed by the day start.
    #[instrument(skip_all, fields(station_id = station_id, year = year, month = month))]
    pub async fn station_month(
        &self,
        station_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Arc<StationDataMap>> {
        self.query_station_data(CacheKey::Month { station_id: station_id.to_owned(), year, month })
            .await
            .with_context(|| format!("failed to fetch {year}-{month:02} data of station `{station_id}`"))
    }

    /// Power samples of the day. Not memoized.
    #[instrument(skip_all, fields(station_id = station_id, day = %day))]
    pub async fn station_day(&self, station_id: &str, day: NaiveDate) -> Result<Vec<StationPower>> {
        let samples: Vec<StationDayData> = self
            .inner
            .post("stationDay", &StationRequest::day(station_id, day))
            .await
            .with_context(|| format!("failed to fetch {day} data of station `{station_id}`"))?;
        info!(n_samples = samples.len(), "fetched");
        samples.into_iter().map(StationPower::try_from).collect()
    }

    /// Inverter AC power samples of the day. Not memoized.
    #[instrument(skip_all, fields(serial_number = serial_number, day = %day))]
    pub async fn inverter_day(
        &self,
        serial_number: &str,
        day: NaiveDate,
    ) -> Result<Vec<InverterPower>> {
        let samples: Vec<InverterDayData> = self
            .inner
            .post("inverterDay", &InverterDayRequest::new(serial_number, day))
            .await
            .with_context(|| format!("failed to fetch {day} data of inverter `{serial_number}`"))?;
        info!(n_samples = samples.len(), "fetched");
        samples.into_iter().map(InverterPower::try_from).collect()
    }

    fn query_station_data(&self, key: CacheKey) -> SharedOutcome<StationDataMap> {
        let inner = Arc::clone(&self.inner);
        self.station_data.get_or_compute(key, move |key| {
            let key = key.clone();
            async move { inner.fetch_station_data(&key).await }
        })
    }
}

struct Inner {
    transport: Transport,
    codec: Codec,
}

impl Inner {
    async fn post<B, R>(&self, resource: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize,
        R: DeserializeOwned + Default,
    {
        let request = Codec::encode(body)?;
        let response = self.transport.send(resource, request.clone()).await?;
        self.codec.observe(resource, &request, &response);
        Codec::decode_data(resource, &response)
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn fetch_station_data(&self, key: &CacheKey) -> Result<StationDataMap, Error> {
        info!("fetching…");
        let station_id = key.station_id();
        let data = match *key {
            CacheKey::AllTime { .. } => collect_station_data::<StationAllData>(
                self.post(key.resource(), &StationRequest::all(station_id)).await?,
            ),
            CacheKey::Year { year, .. } => collect_station_data::<StationPeriodData>(
                self.post(key.resource(), &StationRequest::year(station_id, year)).await?,
            ),
            CacheKey::Month { year, month, .. } => collect_station_data::<StationPeriodData>(
                self.post(key.resource(), &StationRequest::month(station_id, year, month)).await?,
            ),
        };
        info!(n_points = data.len(), "fetched");
        Ok(data)
    }
}

/// Station with a handle to its client.
pub struct Station<'a> {
    api: &'a Api,
    pub details: UserStation,
}

impl Station<'_> {
    pub fn id(&self) -> &str {
        &self.details.id
    }

    pub async fn all(&self) -> Result<Arc<StationDataMap>> {
        self.api.station_all(self.id()).await
    }

    pub async fn year(&self, year: i32) -> Result<Arc<StationDataMap>> {
        self.api.station_year(self.id(), year).await
    }

    pub async fn month(&self, year: i32, month: u32) -> Result<Arc<StationDataMap>> {
        self.api.station_month(self.id(), year, month).await
    }

    pub async fn day(&self, day: NaiveDate) -> Result<Vec<StationPower>> {
        self.api.station_day(self.id(), day).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use mockito::{Matcher, Mock, Server, ServerGuard};
    use serde_json::json;

    use super::*;

    fn api(server: &ServerGuard) -> Result<Api> {
        Ok(Api::builder().key_id("1300386381676").key_secret("secret").base_url(server.url()).build()?)
    }

    async fn mock_station_data(
        server: &mut ServerGuard,
        resource: &str,
        body: serde_json::Value,
        hits: usize,
    ) -> Mock {
        server
            .mock("POST", format!("/v1/api/{resource}").as_str())
            .match_body(Matcher::PartialJson(json!({"money": "GBP", "timeZone": 0, "nmiCode": null})))
            .with_status(200)
            .with_body(json!({"success": true, "code": "0", "msg": "success", "data": body}).to_string())
            .expect(hits)
            .create_async()
            .await
    }

    fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, second).unwrap()
    }

    #[tokio::test]
    async fn test_user_station_list_ok() -> Result {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/api/userStationList")
            .match_header("content-md5", "kxdxk7rbAsrzSIWgEwhH4w==")
            .match_header("authorization", Matcher::Regex(r"^API 1300386381676:".into()))
            .match_body(r#"{"pageNo":1,"pageSize":10}"#)
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "code": "0",
                    "data": {"page": {"current": 1, "pages": 1, "records": [{"id": "42", "allEnergy1": 1.5}]}},
                })
                .to_string(),
            )
            .create_async()
            .await;

        let stations = api(&server)?.user_station_list(Pagination::default()).await?;
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, "42");
        assert_eq!(stations[0].all_energy, 1.5);
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_absent_station_records_are_empty() -> Result {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/api/userStationList")
            .with_status(200)
            .with_body(r#"{"success":true,"code":"0","data":{"page":{"current":1,"pages":0,"records":null}}}"#)
            .create_async()
            .await;
        assert!(api(&server)?.user_station_list(Pagination::default()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_inverter_list_ok() -> Result {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/api/inverterList")
            .match_body(Matcher::Json(json!({"pageNo": 1, "pageSize": 20, "stationId": "42"})))
            .with_status(200)
            .with_body(
                json!({"data": {"page": {"records": [{"id": "7", "sn": "6031023227030011", "pac1": 1.2}]}}})
                    .to_string(),
            )
            .create_async()
            .await;

        let inverters = api(&server)?
            .inverter_list(Pagination { page_no: 1, page_size: 20 }, Some("42"))
            .await?;
        assert_eq!(inverters.len(), 1);
        assert_eq!(inverters[0].serial_number.as_deref(), Some("6031023227030011"));
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_station_all_keyed_by_year_start() -> Result {
        let mut server = Server::new_async().await;
        let mock = mock_station_data(
            &mut server,
            "stationAll",
            json!([{"year": 2023, "energy": 3456.0}, {"year": 2024, "energy": 3789.0}]),
            1,
        )
        .await;

        let data = api(&server)?.station_all("1").await?;
        let keys = data.keys().copied().collect_vec();
        assert_eq!(keys, [utc(2023, 1, 1, 0, 0, 0), utc(2024, 1, 1, 0, 0, 0)]);
        assert_eq!(data[&utc(2024, 1, 1, 0, 0, 0)].totals().energy, 3789.0);
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_station_year_is_fetched_once() -> Result {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/api/stationYear")
            .match_body(Matcher::PartialJson(json!({"id": "1", "money": "GBP", "year": "2023", "timeZone": 0})))
            .with_status(200)
            .with_body(json!({"success": true, "data": [{"date": 1_700_000_000_000_i64, "energy": 20.1}]}).to_string())
            .expect(1)
            .create_async()
            .await;

        let api = api(&server)?;
        let (first, second) = tokio::join!(api.station_year("1", 2023), api.station_year("1", 2023));
        let (first, second) = (first?, second?);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &api.station_year("1", 2023).await?));

        let (time, point) = first.iter().next().context("no data")?;
        assert_eq!(*time, utc(2023, 11, 14, 22, 13, 20));
        assert!(matches!(point, StationDataPoint::Period(_)));
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_station_years_are_independent() -> Result {
        let mut server = Server::new_async().await;
        let mock = mock_station_data(&mut server, "stationYear", json!([]), 2).await;

        let api = api(&server)?;
        let (first, second) = tokio::join!(api.station_year("1", 2023), api.station_year("1", 2024));
        assert!(first?.is_empty());
        assert!(second?.is_empty());
        assert_eq!(api.station_data.len(), 2);
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_station_month_request() -> Result {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/api/stationMonth")
            .match_body(Matcher::Json(json!({
                "id": "1",
                "money": "GBP",
                "month": "2024-06",
                "timeZone": 0,
                "nmiCode": null,
            })))
            .with_status(200)
            .with_body(
                json!({"data": [
                    {"date": 1_717_200_000_000_i64, "energy": 10.5, "gridSellEnergy": 4.0},
                    {"date": 1_717_286_400_000_i64, "energy": 12.0, "gridSellEnergy": 6.5},
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let data = api(&server)?.station_month("1", 2024, 6).await?;
        let keys = data.keys().copied().collect_vec();
        assert_eq!(keys, [utc(2024, 6, 1, 0, 0, 0), utc(2024, 6, 2, 0, 0, 0)]);
        let exported: f64 = data.values().map(|point| point.totals().grid_sell_energy).sum();
        assert_eq!(exported, 10.5);
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_station_day_is_not_cached() -> Result {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/api/stationDay")
            .match_body(Matcher::PartialJson(json!({"id": "1", "money": "GBP", "time": "2024-06-05", "timeZone": 0})))
            .with_status(200)
            .with_body(
                json!({"data": [{"time": 1_717_588_800_000_i64, "timeZone": 1.0, "produceEnergy": 2.5, "batteryPower": 0.3, "psum": -1.1, "consumeEnergy": 0.9}]})
                    .to_string(),
            )
            .expect(2)
            .create_async()
            .await;

        let api = api(&server)?;
        let day = NaiveDate::from_ymd_opt(2024, 6, 5).context("invalid date")?;
        let first = api.station_day("1", day).await?;
        let second = api.station_day("1", day).await?;
        assert_eq!(first, second);
        assert_eq!(first[0].time.naive_local(), utc(2024, 6, 5, 13, 0, 0).naive_utc());
        assert_eq!(first[0].grid, -1.1);
        assert!(api.station_data.is_empty());
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_inverter_day_ok() -> Result {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/api/inverterDay")
            .match_body(Matcher::Json(json!({"sn": "6031023227030011", "time": "2024-06-17", "timeZone": 0})))
            .with_status(200)
            .with_body(
                json!({"data": [{"dataTimestamp": "1718614800000", "timeZone": 0, "pac": 1520, "pacPec": "0.001", "pacStr": "kW"}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let day = NaiveDate::from_ymd_opt(2024, 6, 17).context("invalid date")?;
        let samples = api(&server)?.inverter_day("6031023227030011", day).await?;
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].time, utc(2024, 6, 17, 9, 0, 0));
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_request_failure_is_propagated_and_cached() -> Result {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/api/stationAll")
            .with_status(401)
            .with_body(r#"{"msg":"invalid signature"}"#)
            .expect(1)
            .create_async()
            .await;

        let api = api(&server)?;
        for _ in 0..2 {
            let error = api.station_all("1").await.unwrap_err();
            assert!(format!("{error:#}").contains("invalid signature"));
            match error.downcast_ref::<Error>() {
                Some(Error::RequestFailed { status, .. }) => assert_eq!(status.as_u16(), 401),
                _ => panic!("unexpected error: {error:#}"),
            }
        }
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_response_fails_to_decode() -> Result {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/api/stationYear")
            .with_status(200)
            .with_body(r#"{"data":[{"energy":1.0}]}"#)
            .create_async()
            .await;

        let error = api(&server)?.station_year("1", 2023).await.unwrap_err();
        assert!(matches!(error.downcast_ref::<Error>(), Some(Error::Decode { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_station_handle() -> Result {
        let mut server = Server::new_async().await;
        let _stations = server
            .mock("POST", "/v1/api/userStationList")
            .with_status(200)
            .with_body(json!({"data": {"page": {"records": [{"id": "42"}]}}}).to_string())
            .create_async()
            .await;
        let station_all = server
            .mock("POST", "/v1/api/stationAll")
            .match_body(Matcher::PartialJson(json!({"id": "42"})))
            .with_status(200)
            .with_body(json!({"data": [{"year": 2020}]}).to_string())
            .create_async()
            .await;

        let api = api(&server)?;
        let stations = api.stations(Pagination::default()).await?;
        assert_eq!(stations[0].id(), "42");
        assert_eq!(stations[0].all().await?.len(), 1);
        station_all.assert_async().await;
        Ok(())
    }

    #[test]
    fn test_empty_credentials_fail_fast() {
        let result = Api::builder().key_id("").key_secret("secret").build();
        assert!(matches!(result, Err(Error::Signing(_))));
    }

    #[tokio::test]
    #[ignore = "makes the API request"]
    async fn test_user_station_list_live() -> Result {
        let _ = dotenvy::dotenv();
        let api = Api::builder()
            .key_id(std::env::var("SOLIS_KEY_ID")?)
            .key_secret(std::env::var("SOLIS_KEY_SECRET")?)
            .debug(true)
            .build()?;
        for station in api.stations(Pagination::default()).await? {
            let data = station.all().await?;
            assert!(!data.is_empty());
        }
        Ok(())
    }
}
