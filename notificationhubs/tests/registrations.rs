use time::macros::datetime;
use wiremock::matchers::{body_string_contains, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notification_hubs::client::{Client, ClientConfig};
use notification_hubs::format::{NotificationFormat, TargetPlatform};
use notification_hubs::http::error::ErrorCode;
use notification_hubs::http::registrations::delete::DeleteRegistrationRequest;
use notification_hubs::http::registrations::get::GetRegistrationRequest;
use notification_hubs::http::registrations::list::ListRegistrationsRequest;
use notification_hubs::http::registrations::{RegisteredDevice, Registration, TemplateRegistration};
use notification_hubs::http::Error;

const APPLE_REGISTRATION: &str = include_str!("fixtures/apple_registration.xml");
const FCMV1_TEMPLATE_REGISTRATION: &str = include_str!("fixtures/fcmv1_template_registration.xml");
const REGISTRATIONS: &str = include_str!("fixtures/registrations.xml");
const ATOM_ENTRY: &str = "application/atom+xml;type=entry;charset=utf-8";

#[ctor::ctor]
fn init() {
    let _ = tracing_subscriber::fmt::try_init();
}

fn client(endpoint: &str) -> Client {
    let config = ClientConfig::default()
        .with_connection_string(format!(
            "Endpoint={endpoint}/;SharedAccessKeyName=DefaultFullSharedAccessSignature;SharedAccessKey=c2VjcmV0"
        ))
        .with_hub_path("testhub");
    Client::new(config).unwrap()
}

#[tokio::test]
async fn test_registration() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/testhub/registrations/8247220326459738692-7748251457295609952-1"))
        .and(query_param("api-version", "2016-07"))
        .respond_with(ResponseTemplate::new(200).set_body_string(APPLE_REGISTRATION))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let result = client
        .registration(&GetRegistrationRequest {
            registration_id: "8247220326459738692-7748251457295609952-1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!("8247220326459738692-7748251457295609952-1", result.title);
    let content = result.content.as_ref().unwrap();
    assert_eq!(Some(NotificationFormat::Apple), content.format());
    assert_eq!(Some(TargetPlatform::Apple), content.target());
    let expected = RegisteredDevice {
        device_id: "ABCDEF".to_string(),
        registration_id: "8247220326459738692-7748251457295609952-1".to_string(),
        expiration_time: Some(datetime!(2029-04-23 09:12:50 UTC)),
        tags: vec!["tag1".to_string(), "tag2".to_string()],
        template: None,
        etag: "1".to_string(),
    };
    assert_eq!(Some(&expected), result.registered_device());
}

#[tokio::test]
async fn test_registrations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/testhub/registrations"))
        .and(query_param("api-version", "2016-07"))
        .and(query_param_is_missing("ContinuationToken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(REGISTRATIONS)
                .insert_header("X-MS-ContinuationToken", "next-page"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let registrations = client.registrations(&ListRegistrationsRequest::default()).await.unwrap();
    assert_eq!("Registrations", registrations.title);
    assert_eq!(Some("next-page".to_string()), registrations.continuation_token);
    assert_eq!(4, registrations.entries.len());

    let devices: Vec<(&str, Option<TargetPlatform>)> = registrations
        .entries
        .iter()
        .map(|e| {
            (
                e.registered_device().unwrap().device_id.as_str(),
                e.content.as_ref().unwrap().target(),
            )
        })
        .collect();
    assert_eq!(
        vec![
            ("ABCDEF", Some(TargetPlatform::Apple)),
            ("QWERTY", Some(TargetPlatform::Apple)),
            ("ZXCVBN", Some(TargetPlatform::Apple)),
            ("ANDROIDID", Some(TargetPlatform::FcmV1)),
        ],
        devices
    );
    assert!(registrations.entries[2].registered_device().unwrap().tags.is_empty());
}

#[tokio::test]
async fn test_registrations_by_tag_with_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/testhub/tags/tag1/registrations"))
        .and(query_param("$top", "2"))
        .and(query_param("ContinuationToken", "next-page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REGISTRATIONS))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let registrations = client
        .registrations(&ListRegistrationsRequest {
            tag: Some("tag1".to_string()),
            top: Some(2),
            continuation_token: Some("next-page".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(None, registrations.continuation_token);
    assert_eq!(4, registrations.entries.len());
}

#[tokio::test]
async fn test_register() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/testhub/registrations"))
        .and(header("Content-Type", ATOM_ENTRY))
        .and(body_string_contains("<AppleRegistrationDescription "))
        .and(body_string_contains("<Tags>tag1,tag2</Tags><DeviceToken>ABCDEF</DeviceToken>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(APPLE_REGISTRATION))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let registration = Registration::new("ABCDEF", NotificationFormat::Apple).with_tags("tag1,tag2");
    let result = client.register(&registration).await.unwrap();
    assert_eq!("ABCDEF", result.registered_device().unwrap().device_id);
}

#[tokio::test]
async fn test_register_with_template_updates() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/testhub/registrations/fcmv1-reg-123"))
        .and(header("Content-Type", ATOM_ENTRY))
        .and(body_string_contains("<FcmV1TemplateRegistrationDescription "))
        .and(body_string_contains("<FcmV1RegistrationId>fcmv1-device-123</FcmV1RegistrationId>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FCMV1_TEMPLATE_REGISTRATION))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let template = r#"{"message":{"notification":{"title":"$(title)","body":"$(message)"}}}"#;
    let registration = TemplateRegistration::new("fcmv1-device-123", TargetPlatform::FcmV1Template, template)
        .with_tags("tag1,tag2")
        .with_registration_id("fcmv1-reg-123");
    let result = client.register_with_template(&registration).await.unwrap();
    let content = result.content.as_ref().unwrap();
    assert_eq!(Some(NotificationFormat::Template), content.format());
    assert_eq!(Some(TargetPlatform::FcmV1Template), content.target());
    let device = result.registered_device().unwrap();
    assert_eq!(Some(template), device.template.as_deref());
    assert_eq!(Some(datetime!(9999-12-31 23:59:59.9999999 UTC)), device.expiration_time);
}

#[tokio::test]
async fn test_unregister() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/testhub/registrations/8247220326459738692-7748251457295609952-1"))
        .and(header("If-Match", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/testhub/registrations/any-version"))
        .and(header("If-Match", "*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let device = RegisteredDevice {
        device_id: "ABCDEF".to_string(),
        registration_id: "8247220326459738692-7748251457295609952-1".to_string(),
        etag: "1".to_string(),
        ..Default::default()
    };
    client.unregister(&device).await.unwrap();
    client
        .delete_registration(&DeleteRegistrationRequest {
            registration_id: "any-version".to_string(),
            etag: String::new(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_not_found_is_classified() {
    let server = MockServer::start().await;
    let body = "<Error><Code>404</Code><Detail>The requested resource does not exist.</Detail></Error>";
    Mock::given(method("GET"))
        .and(path("/testhub/registrations/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(body)
                .insert_header("x-ms-request-id", "7a2d8e1c-request"),
        )
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let err = client
        .registration(&GetRegistrationRequest {
            registration_id: "missing".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(Some(ErrorCode::RegistrationNotFound), err.code());
    assert!(!err.is_retryable());
    match err {
        Error::Hub(e) => {
            assert_eq!(Some(404), e.status_code);
            assert_eq!(Some("7a2d8e1c-request".to_string()), e.request_id);
            assert_eq!(Some(body.to_string()), e.details);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_throttled_and_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/testhub/registrations"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/testhub/registrations/any"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let err = client
        .registrations(&ListRegistrationsRequest::default())
        .await
        .unwrap_err();
    assert_eq!(Some(ErrorCode::RateLimited), err.code());
    assert!(err.is_retryable());

    let err = client
        .registration(&GetRegistrationRequest {
            registration_id: "any".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(Some(ErrorCode::Unauthorized), err.code());
    assert!(err.is_authentication_error());
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/testhub/registrations/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<entry><id>1</entry>"))
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let err = client
        .registration(&GetRegistrationRequest {
            registration_id: "broken".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_transport_error() {
    let client = client("http://127.0.0.1:1");
    let err = client
        .registration(&GetRegistrationRequest {
            registration_id: "any".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpClient(_)));
    assert!(err.is_retryable());
    assert_eq!(None, err.code());
}
