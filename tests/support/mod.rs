//! Scripted HTTP transport shared by the behaviour tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use coinsight_core::{
    DashboardConfig, HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, ProviderId,
};

struct Route {
    pattern: String,
    responses: Vec<Result<HttpResponse, HttpError>>,
}

/// Answers requests by the first route whose pattern occurs in the URL.
///
/// A route scripted with several responses hands them out in order and then
/// keeps repeating the last one. Unmatched URLs get a 404.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(self: &Arc<Self>, pattern: &str, body: &str) -> Arc<Self> {
        self.route_sequence(pattern, vec![Ok(HttpResponse::ok_json(body))])
    }

    pub fn route_status(self: &Arc<Self>, pattern: &str, status: u16, body: &str) -> Arc<Self> {
        self.route_sequence(pattern, vec![Ok(HttpResponse::with_status(status, body))])
    }

    pub fn route_sequence(
        self: &Arc<Self>,
        pattern: &str,
        mut responses: Vec<Result<HttpResponse, HttpError>>,
    ) -> Arc<Self> {
        responses.reverse();
        self.routes.lock().expect("routes lock").push(Route {
            pattern: pattern.to_owned(),
            responses,
        });
        Arc::clone(self)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .filter(|request| request.url.contains(pattern))
            .count()
    }

    fn respond(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let mut routes = self.routes.lock().expect("routes lock");
        let Some(route) = routes.iter_mut().find(|route| url.contains(&route.pattern)) else {
            return Ok(HttpResponse::with_status(404, "{}"));
        };

        if route.responses.len() > 1 {
            route.responses.pop().unwrap_or_else(|| Ok(HttpResponse::with_status(404, "{}")))
        } else {
            route
                .responses
                .last()
                .cloned()
                .unwrap_or_else(|| Ok(HttpResponse::with_status(404, "{}")))
        }
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        let response = self.respond(&request.url);
        self.requests.lock().expect("requests lock").push(request);
        Box::pin(async move { response })
    }
}

/// Configuration pointing every external service at scripted routes, with
/// retries disabled so failures surface immediately.
pub fn test_config() -> DashboardConfig {
    DashboardConfig {
        quote_source: ProviderId::Coingecko,
        series_source: ProviderId::Coingecko,
        cryptopanic_token: Some(String::from("test-token")),
        generator_url: String::from("http://generator.test"),
        max_retries: 0,
        ..DashboardConfig::default()
    }
}

pub const BITCOIN_PRICE: &str = r#"{"bitcoin": {"usd": 65000.12}}"#;

pub const BITCOIN_PRICE_WITH_CHANGE: &str =
    r#"{"bitcoin": {"usd": 100, "usd_24h_change": 4.1666666667}}"#;

pub const BITCOIN_CHART: &str =
    r#"{"prices": [[1000, 10.0], [2000, 10.5], [3000, 11.0]], "market_caps": [], "total_volumes": []}"#;

pub const BITCOIN_POSTS: &str = r#"{
    "results": [
        {"title": "X", "url": "https://news.test/x", "source": {"title": "Wire"}, "summary": "Y"},
        {"title": "Second story", "url": "https://news.test/2", "domain": "news.test"}
    ]
}"#;

pub const COMPLETION: &str = r#"{"choices": [{"text": " Prices rose on ETF demand. "}]}"#;

/// Kline row with the given open time and close price.
pub fn kline(open_ms: i64, close: &str) -> String {
    format!(r#"[{open_ms},"1.0","2.0","0.5","{close}","100.0",{open_ms},"0",1,"0","0","0"]"#)
}
