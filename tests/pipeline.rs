//! End-to-end runs against a local mock server standing in for the search
//! provider and the news sites.

use news_sentiment::analysis::{Analyzers, compare};
use news_sentiment::config::PipelineConfig;
use news_sentiment::delay::{DelayPolicy, NoDelay};
use news_sentiment::discovery::{Discovery, NoProgress, RunParams};
use news_sentiment::error::DiscoveryError;
use news_sentiment::extract::ContentExtractor;
use news_sentiment::http::ReqwestFetcher;
use news_sentiment::report::format_report;
use news_sentiment::search::{GoogleNewsHtml, GoogleNewsRss};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn article_page(title: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
    format!("<html><head><title>{title}</title></head><body><article>{body}</article></body></html>")
}

fn results_page(entries: &[(&str, &str)]) -> String {
    let blocks: String = entries
        .iter()
        .map(|(headline, href)| {
            format!(r#"<div class="SoaBEf"><a href="{href}"><div class="mCBkyc">{headline}</div></a></div>"#)
        })
        .collect();
    format!("<html><body><div id=\"rso\">{blocks}</div></body></html>")
}

fn config_for(server: &MockServer) -> PipelineConfig {
    PipelineConfig {
        search_base_url: format!("{}/search", server.uri()),
        rss_base_url: format!("{}/rss/search", server.uri()),
        ..PipelineConfig::default()
    }
}

fn discovery<S: news_sentiment::search::SearchProvider>(
    search: S,
    config: &PipelineConfig,
) -> Discovery<S, ReqwestFetcher> {
    let delay: Arc<dyn DelayPolicy> = Arc::new(NoDelay);
    let fetcher = ReqwestFetcher::new().unwrap();
    let extractor = ContentExtractor::new(fetcher, delay.clone(), config);
    Discovery::new(search, extractor, Arc::new(Analyzers::new(config)), delay, config)
}

#[tokio::test]
async fn test_html_search_to_report() {
    let server = MockServer::start().await;
    let base = server.uri();
    let config = config_for(&server);

    let first = format!("{base}/news/profits");
    let redirected = format!("{base}/news/lawsuit");
    let redirect_href = format!(
        "/url?q={}&sa=U&ved=abc",
        urlencoding::encode(&redirected)
    );
    let blocked = format!("{base}/news/walled");

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("start", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[])))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Acme company news"))
        .and(query_param("tbm", "nws"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[
            ("Acme profits soar", first.as_str()),
            ("Acme behind a wall", blocked.as_str()),
            ("Acme sued", redirect_href.as_str()),
            ("Acme profits soar again", first.as_str()),
            ("Access Denied", format!("{base}/news/never").as_str()),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news/profits"))
        .and(headers("user-agent", config.user_agents[0].split(',').map(str::trim).collect()))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_page(
            "Acme posts record profits",
            &[
                "Acme reported excellent quarterly results, with strong revenue growth and great margins.",
                "Investors cheered the outstanding performance and the stock climbed to a record high.",
            ],
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news/lawsuit"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_page(
            "Acme faces fraud lawsuit",
            &[
                "A terrible lawsuit accuses Acme of fraud, and regulators warned of serious penalties.",
                "The court case is a disaster for the company and shareholders fear heavy losses.",
            ],
        )))
        .expect(1)
        .mount(&server)
        .await;

    // Primary and alternate identity both see the challenge page.
    Mock::given(method("GET"))
        .and(path("/news/walled"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Just a moment...</title></head><body></body></html>"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let search = GoogleNewsHtml::new(ReqwestFetcher::new().unwrap(), &config).unwrap();
    let params = RunParams::new("Acme", 2, 5).unwrap();
    let result = discovery(search, &config)
        .discover(&params, &NoProgress, &CancellationToken::new())
        .await
        .unwrap();

    let urls: Vec<&str> = result.articles.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(urls, vec![first.as_str(), redirected.as_str()]);
    assert!(result.shortfall.is_none());
    assert_eq!(result.articles[0].title, "Acme posts record profits");
    assert_eq!(result.articles[0].headline, "Acme profits soar");

    let scorer = news_sentiment::analysis::sentiment::SentimentScorer::new();
    let comparison = compare::analyze(&result, &scorer);
    let report = serde_json::to_value(format_report(&result, &comparison)).unwrap();

    assert_eq!(report["COMPANY"], "Acme");
    assert_eq!(report["ARTICLES"][0]["SENTIMENT"], "Positive");
    assert_eq!(report["ARTICLES"][1]["SENTIMENT"], "Negative");
    assert_eq!(
        report["COMPARATIVE_SENTIMENT_SCORE"]["SENTIMENT_DISTRIBUTION"]["POSITIVE"],
        1
    );
    assert_eq!(report["Coverage Differences"].as_array().unwrap().len(), 1);
    assert!(report["Topic Overlap"]["Unique Topics"]["Article 2"].is_array());
    assert!(report.get("WARNINGS").is_none());
}

#[tokio::test]
async fn test_rss_provider_pages_through_feed() {
    let server = MockServer::start().await;
    let base = server.uri();
    let config = PipelineConfig {
        page_size: 2,
        ..config_for(&server)
    };

    let items: String = (1..=3)
        .map(|i| {
            format!("<item><title>Acme story {i}</title><link>{base}/story/{i}</link></item>")
        })
        .collect();
    let feed = format!(r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Acme</title>{items}</channel></rss>"#);

    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .and(query_param("q", "Acme company news"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed))
        .mount(&server)
        .await;

    for i in 1..=3 {
        Mock::given(method("GET"))
            .and(path(format!("/story/{i}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(article_page(
                &format!("Acme story {i}"),
                &["Acme opened a new factory this week and plans to hire several hundred workers in the region."],
            )))
            .expect(1)
            .mount(&server)
            .await;
    }

    let search = GoogleNewsRss::new(ReqwestFetcher::new().unwrap(), &config);
    let params = RunParams::new("Acme", 1, 10).unwrap();
    let result = discovery(search, &config)
        .discover(&params, &NoProgress, &CancellationToken::new())
        .await
        .unwrap();

    let titles: Vec<&str> = result.articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Acme story 1", "Acme story 2", "Acme story 3"]);
}

#[tokio::test]
async fn test_unavailable_provider_finds_nothing() {
    let server = MockServer::start().await;
    let config = config_for(&server);

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let search = GoogleNewsHtml::new(ReqwestFetcher::new().unwrap(), &config).unwrap();
    let params = RunParams::new("Acme", 1, 5).unwrap();
    let err = discovery(search, &config)
        .discover(&params, &NoProgress, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DiscoveryError::NoArticlesFound { ref entity } if entity == "Acme"));
}
