//! EC2 metadata provider against a mock metadata service.

use eureka_client::{Ec2MetadataProvider, InstanceRecord, MetadataProvider, Status};
use eureka_config::{ClientConfig, DataCenter};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> Ec2MetadataProvider {
    Ec2MetadataProvider::with_base_url(Url::parse(&format!("{}/latest/", server.uri())).unwrap())
        .unwrap()
}

#[tokio::test]
async fn test_session_token_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/latest/api/token"))
        .and(header("x-aws-ec2-metadata-token-ttl-seconds", "21600"))
        .respond_with(ResponseTemplate::new(200).set_body_string("token-1"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/latest/meta-data/instance-id"))
        .and(header("x-aws-ec2-metadata-token", "token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("i-1234\n"))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(provider(&server).get("instance-id").await.as_deref(), Some("i-1234"));
}

#[tokio::test]
async fn test_zone_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest/meta-data/placement/availability-zone"))
        .respond_with(ResponseTemplate::new(200).set_body_string("us-east-1b"))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(
        provider(&server).get("availability-zone").await.as_deref(),
        Some("us-east-1b")
    );
}

#[tokio::test]
async fn test_missing_key_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(provider(&server).get("public-ipv4").await.is_none());
}

#[tokio::test]
async fn test_unreachable_service_is_none() {
    let provider =
        Ec2MetadataProvider::with_base_url(Url::parse("http://127.0.0.1:1/latest/").unwrap()).unwrap();

    assert!(provider.get("instance-id").await.is_none());
}

async fn mount_token(server: &MockServer, calls: u64) {
    Mock::given(method("PUT"))
        .and(path("/latest/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("token-1"))
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_get_all_shares_one_token() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/latest/meta-data/instance-id"))
        .and(header("x-aws-ec2-metadata-token", "token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("i-1234"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/latest/meta-data/local-ipv4"))
        .and(header("x-aws-ec2-metadata-token", "token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("10.0.0.1"))
        .mount(&server)
        .await;

    let values = provider(&server)
        .get_all(&["instance-id", "local-ipv4", "public-ipv4"])
        .await;

    assert_eq!(values.len(), 2);
    assert_eq!(values["instance-id"], "i-1234");
    assert_eq!(values["local-ipv4"], "10.0.0.1");
}

#[tokio::test]
async fn test_amazon_record_reads_metadata_in_one_pass() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/latest/meta-data/instance-id"))
        .respond_with(ResponseTemplate::new(200).set_body_string("i-1234"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = ClientConfig::builder("my-service")
        .eureka_url("http://eureka:8080/eureka/v2")
        .datacenter(DataCenter::Amazon)
        .hostname("host-1")
        .build()
        .unwrap();

    let record = InstanceRecord::local(&config, &provider(&server), Status::Up).await;
    assert_eq!(record.instance_id, "i-1234");
    assert_eq!(record.data_center_info.metadata.len(), 1);
}
