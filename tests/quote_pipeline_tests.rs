//! End-to-end batch runs against mocked shop pages, image hosts and the
//! render API

use httpmock::prelude::*;
use image::{Rgba, RgbaImage};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

use quote_scraper::domain::ManufacturerTag;
use quote_scraper::infrastructure::config::{ImageProcessingConfig, RenderApiConfig};
use quote_scraper::infrastructure::http_client::{HttpClient, HttpClientConfig};
use quote_scraper::infrastructure::parsing::{GastroHeroSelectors, GgmSelectors};
use quote_scraper::infrastructure::{GastroHeroParser, GgmParser, ImagePostProcessor, RenderClient};
use quote_scraper::{ProductImage, QuotePipeline, QuoteSession};

const LOCAL_HOST: &str = "127.0.0.1";

fn ggm_page(image_src: &str, price_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><body>
  <div class="text-sm font-light text-[#332e2e]">Art.-Nr. KSG-740-E</div>
  <h1> Kühlschrank Edelstahl 740 Liter </h1>
  {price_html}
  <img src="{image_src}">
  <div class="ggmDescription">
    <p><strong>Ausstattung</strong></p>
    <ul><li>Umluftkühlung</li><li>Abtauautomatik</li></ul>
  </div>
</body></html>"#
    )
}

fn gastro_hero_page(image_src: &str) -> String {
    format!(
        r#"<html><body>
  <h1>Kombidämpfer 10x GN 1/1</h1>
  <span class="inner-sku">GH-100234</span>
  <div class="buy-box-price__display"><span>3.199,00 €</span> 2.849,95 € </div>
  <img src="{image_src}">
  <div data-tracking="product.tab-container.description">
    <div class="tab-content--have-gradient">
      <p>Produktvorteile im Überblick</p>
      <ul><li>Kurz</li></ul>
      <p>Leistungsstark und sparsam.</p>
      <ul><li>10 Einschübe</li></ul>
    </div>
  </div>
</body></html>"#
    )
}

/// White 30x20 canvas with a blue 8x5 product in the middle
fn product_png() -> Vec<u8> {
    let mut image = RgbaImage::from_pixel(30, 20, Rgba([255, 255, 255, 255]));
    for x in 11..19 {
        for y in 7..12 {
            image.put_pixel(x, y, Rgba([20, 40, 180, 255]));
        }
    }
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
    buffer.into_inner()
}

fn pipeline(server: &MockServer, api_key: Option<&str>) -> QuotePipeline {
    let http = Arc::new(HttpClient::new(&HttpClientConfig::default()).unwrap());
    let renderer = Arc::new(
        RenderClient::new(RenderApiConfig {
            endpoint: server.url("/v1/extract"),
            api_key: api_key.map(str::to_string),
            ..Default::default()
        })
        .unwrap(),
    );

    let ggm = GgmParser::with_selectors(
        Arc::clone(&http),
        GgmSelectors {
            image_host: LOCAL_HOST.to_string(),
            ..Default::default()
        },
    )
    .unwrap();
    let gastro_hero = GastroHeroParser::with_selectors(
        renderer,
        GastroHeroSelectors {
            image_host: LOCAL_HOST.to_string(),
            ..Default::default()
        },
    )
    .unwrap();
    let images = ImagePostProcessor::new(http, ImageProcessingConfig::default());

    QuotePipeline::new(ggm, gastro_hero, images)
}

#[tokio::test]
async fn test_ggm_product_with_cropped_image() {
    let server = MockServer::start_async().await;
    let page = ggm_page(
        &server.url("/media/ksg740.png"),
        r#"<span class="product-text-shadow">1.234,56 €</span>"#,
    );
    let page_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/ggmgastro/kuehlschrank-ksg-740");
            then.status(200).header("content-type", "text/html").body(&page);
        })
        .await;
    let png = product_png();
    server
        .mock_async(|when, then| {
            when.method(GET).path("/media/ksg740.png");
            then.status(200).header("content-type", "image/png").body(&png);
        })
        .await;

    let mut session = QuoteSession::new();
    let text = format!("Bitte anbieten:\r\n{}", server.url("/ggmgastro/kuehlschrank-ksg-740"));
    let report = pipeline(&server, None).add_products(&text, &mut session).await;

    page_mock.assert_async().await;
    assert!(report.is_clean());
    assert_eq!(report.added, vec![1]);

    let row = &session.table.rows()[0];
    assert_eq!(row.position, Some(1));
    assert_eq!(row.article_number.as_deref(), Some("KSG-740-E"));
    assert_eq!(row.title, "Kühlschrank Edelstahl 740 Liter");
    assert_eq!(row.description, "Ausstattung:\n  • Umluftkühlung\n  • Abtauautomatik");
    assert_eq!(row.quantity, Some(1.0));
    assert_eq!(row.unit_price, Some(1234.56));
    assert_eq!(row.total_price, Some(1234.56));
    assert_eq!(row.manufacturer_tag, ManufacturerTag::Ggm);
    assert!(!row.is_alternative);

    let image = session.images.get("KSG-740-E").expect("image registered");
    assert_eq!(image.dimensions(), (8, 5));
}

#[tokio::test]
async fn test_ggm_page_without_price_and_missing_image() {
    let server = MockServer::start_async().await;
    let page = ggm_page(&server.url("/media/gone.png"), "");
    server
        .mock_async(|when, then| {
            when.method(GET).path("/ggmgastro/ohne-preis");
            then.status(200).body(&page);
        })
        .await;
    let image_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/media/gone.png");
            then.status(404);
        })
        .await;

    let mut session = QuoteSession::new();
    let report = pipeline(&server, None)
        .add_products(&server.url("/ggmgastro/ohne-preis"), &mut session)
        .await;

    image_mock.assert_async().await;
    assert_eq!(report.added, vec![1]);
    let row = &session.table.rows()[0];
    assert_eq!(row.unit_price, Some(0.0));
    assert_eq!(row.total_price, Some(0.0));
    assert!(session.images.is_empty());
}

#[tokio::test]
async fn test_gastro_hero_product_through_render_api() {
    let server = MockServer::start_async().await;
    let product_url = "https://www.gastro-hero.de/kombidaempfer-10x-gn";
    let rendered = gastro_hero_page(&server.url("/gh-media/kombi.png"));
    let render_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/extract")
                .header("authorization", "Basic c2VjcmV0Og==")
                .json_body(json!({ "url": product_url, "browserHtml": true }));
            then.status(200).json_body(json!({ "url": product_url, "browserHtml": rendered }));
        })
        .await;
    let png = product_png();
    server
        .mock_async(|when, then| {
            when.method(GET).path("/gh-media/kombi.png");
            then.status(200).body(&png);
        })
        .await;

    let mut session = QuoteSession::new();
    let report = pipeline(&server, Some("secret"))
        .add_products(product_url, &mut session)
        .await;

    render_mock.assert_async().await;
    assert_eq!(report.added, vec![1]);

    let row = &session.table.rows()[0];
    assert_eq!(row.article_number.as_deref(), Some("GH-100234"));
    assert_eq!(row.title, "Kombidämpfer 10x GN 1/1");
    assert_eq!(row.description, "Leistungsstark und sparsam.\n• 10 Einschübe");
    assert_eq!(row.unit_price, Some(2849.95));
    assert_eq!(row.manufacturer_tag, ManufacturerTag::GastroHero);
    assert!(session.images.contains("GH-100234"));
}

#[tokio::test]
async fn test_batch_continues_after_render_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/extract");
            then.status(401).body(r#"{"title": "Authentication Key Not Found"}"#);
        })
        .await;
    let page = ggm_page("", r#"<span class="product-text-shadow">89,90 €</span>"#);
    server
        .mock_async(|when, then| {
            when.method(GET).path("/ggmgastro/regal");
            then.status(200).body(&page);
        })
        .await;

    let text = format!(
        "https://www.gastro-hero.de/kombi https://example.com/other {}",
        server.url("/ggmgastro/regal")
    );
    let mut session = QuoteSession::new();
    let report = pipeline(&server, Some("wrong-key")).add_products(&text, &mut session).await;

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].url, "https://www.gastro-hero.de/kombi");
    assert_eq!(report.failed[0].position, 1);
    assert!(report.failed[0].error.contains("401"));
    assert!(!report.failed[0].recoverable);
    assert_eq!(report.unsupported, vec!["https://example.com/other"]);
    assert_eq!(report.added, vec![3]);

    assert_eq!(session.table.len(), 1);
    let row = &session.table.rows()[0];
    assert_eq!(row.position, Some(3));
    assert_eq!(row.unit_price, Some(89.9));
    assert!(session.images.is_empty());
}

#[tokio::test]
async fn test_positions_continue_from_existing_table() {
    let server = MockServer::start_async().await;
    let page = ggm_page("", r#"<span class="product-text-shadow">10,00 €</span>"#);
    server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/ggmgastro/");
            then.status(200).body(&page);
        })
        .await;

    let pipeline = pipeline(&server, None);
    let mut session = QuoteSession::new();
    pipeline
        .add_products(&server.url("/ggmgastro/a"), &mut session)
        .await;
    let text = format!("{}\u{2028}{}", server.url("/ggmgastro/b"), server.url("/ggmgastro/c"));
    let report = pipeline.add_products(&text, &mut session).await;

    assert_eq!(report.added, vec![2, 3]);
    let positions: Vec<_> = session.table.rows().iter().map(|row| row.position).collect();
    assert_eq!(positions, vec![Some(1), Some(2), Some(3)]);
}

#[tokio::test]
async fn test_commit_edits_after_batch() {
    let server = MockServer::start_async().await;
    let page = ggm_page("", r#"<span class="product-text-shadow">25,00 €</span>"#);
    server
        .mock_async(|when, then| {
            when.method(GET).path("/ggmgastro/stuhl");
            then.status(200).body(&page);
        })
        .await;

    let mut session = QuoteSession::new();
    pipeline(&server, None)
        .add_products(&server.url("/ggmgastro/stuhl"), &mut session)
        .await;

    let mut edited = session.table.rows().to_vec();
    edited[0].quantity = Some(4.0);
    let placeholder = ProductImage::from_encoded(&product_png()).unwrap();

    session.commit_edits(edited.clone(), &placeholder).unwrap();
    assert_eq!(session.table.rows()[0].total_price, Some(100.0));
    assert_eq!(session.images.get("KSG-740-E"), Some(&placeholder));

    let unchanged = session.table.rows().to_vec();
    session.commit_edits(unchanged, &placeholder).unwrap();
    assert_eq!(session.table.rows()[0].total_price, Some(100.0));

    edited[0].title = "  ".to_string();
    assert!(session.commit_edits(edited, &placeholder).is_err());
    assert_eq!(session.table.rows()[0].title, "Kühlschrank Edelstahl 740 Liter");
}

#[tokio::test]
async fn test_image_not_downloaded_without_article_number() {
    let server = MockServer::start_async().await;
    let page = ggm_page(
        &server.url("/media/anonymous.png"),
        r#"<span class="product-text-shadow">5,00 €</span>"#,
    )
    .replace("Art.-Nr. KSG-740-E", "");
    server
        .mock_async(|when, then| {
            when.method(GET).path("/ggmgastro/ohne-nummer");
            then.status(200).body(&page);
        })
        .await;
    let png = product_png();
    let image_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/media/anonymous.png");
            then.status(200).body(&png);
        })
        .await;

    let mut session = QuoteSession::new();
    let report = pipeline(&server, None)
        .add_products(&server.url("/ggmgastro/ohne-nummer"), &mut session)
        .await;

    assert_eq!(report.added, vec![1]);
    assert_eq!(session.table.rows()[0].article_number, None);
    image_mock.assert_hits_async(0).await;
    assert!(session.images.is_empty());
}
