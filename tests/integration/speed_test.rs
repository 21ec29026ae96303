//! Tests for the HTTP speed test against a mock server

use std::time::Duration;

use assert_matches::assert_matches;
use fiberbot::{
    MeasurementError, Speed, config::MeasurementSettings, measure::CloudflareSpeedTest,
    measure::SpeedMeasurer,
};
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> MeasurementSettings {
    MeasurementSettings {
        base_url: server.uri(),
        download_bytes: 64 * 1024,
        upload_bytes: 2_500_000,
        ping_count: 3,
        ..MeasurementSettings::default()
    }
}

#[tokio::test]
async fn test_download_measures_received_bytes() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/__down"))
        .and(query_param("bytes", "65536"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64 * 1024]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let speed_test = CloudflareSpeedTest::new(settings(&mock_server)).unwrap();
    let speed = speed_test.measure_download().await.unwrap();

    assert!(speed.bytes_per_second() > 0.0);
}

#[tokio::test]
async fn test_download_server_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/__down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let speed_test = CloudflareSpeedTest::new(settings(&mock_server)).unwrap();
    let result = speed_test.measure_download().await;

    assert_matches!(result, Err(MeasurementError::Status(status)) if status == StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_download_without_data() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/__down"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let speed_test = CloudflareSpeedTest::new(settings(&mock_server)).unwrap();
    let result = speed_test.measure_download().await;

    assert_matches!(result, Err(MeasurementError::EmptyResponse));
}

#[tokio::test]
async fn test_upload_sends_payload_in_chunks() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/__up"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let speed_test = CloudflareSpeedTest::new(settings(&mock_server)).unwrap();
    let speed = speed_test.measure_upload().await.unwrap();

    assert!(speed.bytes_per_second() > 0.0);
}

#[tokio::test]
async fn test_slow_upload_stops_at_the_window() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/__up"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let speed_test = CloudflareSpeedTest::new(MeasurementSettings {
        window: Duration::from_millis(500),
        ..settings(&mock_server)
    })
    .unwrap();
    let speed = speed_test.measure_upload().await.unwrap();

    assert_eq!(speed.bytes_per_second(), 0.0);
}

#[tokio::test]
async fn test_upload_rejected() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/__up"))
        .respond_with(ResponseTemplate::new(413))
        .expect(1)
        .mount(&mock_server)
        .await;

    let speed_test = CloudflareSpeedTest::new(settings(&mock_server)).unwrap();
    let result = speed_test.measure_upload().await;

    assert_matches!(result, Err(MeasurementError::Status(status)) if status == StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_ping_averages_round_trips() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/__down"))
        .and(query_param("bytes", "0"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(20)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let speed_test = CloudflareSpeedTest::new(settings(&mock_server)).unwrap();
    let ping = speed_test.measure_ping().await.unwrap();

    assert!(ping >= std::time::Duration::from_millis(20));
}

#[tokio::test]
async fn test_unreachable_server() {
    let speed_test = CloudflareSpeedTest::new(MeasurementSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        ..MeasurementSettings::default()
    })
    .unwrap();

    let result = speed_test.measure_download().await;

    assert_matches!(result, Err(MeasurementError::Request(_)));
}

/// Serves a `size` byte body at 10 bytes per second
async fn trickling_server(size: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;

        let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {size}\r\n\r\n");
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        for _ in 0..size / 10 {
            if socket.write_all(&[0u8; 10]).await.is_err() {
                return;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    });

    format!("http://{addr}")
}

// Real clock: a paused one would auto-advance past the connect timeout
// while the socket is in flight.
#[tokio::test]
async fn test_slow_download_is_measured_not_failed() {
    let base_url = trickling_server(2000).await;
    let speed_test = CloudflareSpeedTest::new(MeasurementSettings {
        base_url,
        download_bytes: 2000,
        window: Duration::from_secs(2),
        ..MeasurementSettings::default()
    })
    .unwrap();

    let start = tokio::time::Instant::now();
    let speed = speed_test.measure_download().await.unwrap();

    // the 200 second body is cut off at the window
    assert!(start.elapsed() < Duration::from_secs(10));
    assert!(speed < Speed::from_megabits_per_second(12.5));
}
