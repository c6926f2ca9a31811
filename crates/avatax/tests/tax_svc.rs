//! End-to-end behaviour of `TaxSvc` over `AvaTaxClient` against a mock AvaTax.

use std::sync::Arc;
use std::time::Duration;

use avatax::{tax_svc, AvaTaxConfig, CLIENT_HEADER};
use httpmock::prelude::*;
use serde_json::{json, Value};
use taxsvc::{Address, RetryPolicy, TaxError, TaxResult, TaxSvc, TaxSvcConfig, TransactionRequest};
use url::Url;

// base64("user:pass")
const BASIC_AUTH: &str = "Basic dXNlcjpwYXNz";

fn config_for(server: &MockServer) -> AvaTaxConfig {
    let mut config = AvaTaxConfig::new("user", "pass");
    config.endpoint = Some(Url::parse(&server.base_url()).unwrap());
    config.company_code = taxsvc::CompanyCode::new("SHOP1").unwrap();
    config
}

fn svc_for(server: &MockServer) -> TaxSvc {
    tax_svc(config_for(server), Arc::new(TaxSvcConfig::default()))
}

fn request_hash() -> Value {
    json!({
        "createTransactionModel": {
            "code": "R123456789",
            "type": "SalesOrder",
            "companyCode": "SHOP1",
            "customerCode": "1",
            "date": "2024-03-01",
            "commit": false,
            "addresses": {
                "shipFrom": {
                    "line1": "915 S Jackson St",
                    "city": "Montgomery",
                    "region": "AL",
                    "postalCode": "36104",
                    "country": "US"
                },
                "shipTo": {
                    "line1": "2000 Main Street",
                    "city": "Irvine",
                    "region": "CA",
                    "postalCode": "92614",
                    "country": "US"
                }
            },
            "lines": [
                {
                    "number": "1",
                    "quantity": 1,
                    "amount": 10.0,
                    "itemCode": "SKU-1",
                    "taxCode": "PC030147"
                }
            ]
        }
    })
}

fn first_key(result: &TaxResult) -> &str {
    result.tax_result().keys().next().map(String::as_str).unwrap_or("")
}

#[tokio::test]
async fn get_tax_returns_total_tax() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v2/transactions/createoradjust")
            .header("authorization", BASIC_AUTH)
            .header(CLIENT_HEADER, "taxsvc; 0.1.0; RustClient; 2; unknown")
            .json_body(request_hash());
        then.status(201)
            .header("content-type", "application/json")
            .json_body(json!({"code": "R123456789", "status": "Saved", "totalTax": 0.8}));
    });

    let request = TransactionRequest::from_value(request_hash()).unwrap();
    let result = svc_for(&server).get_tax(&request).await.unwrap();

    mock.assert();
    assert!(result.is_success());
    assert_eq!(result.total_tax(), Some(0.8));
}

#[tokio::test]
async fn get_tax_without_params_never_calls_avatax() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.any_request();
        then.status(500);
    });

    let request = TransactionRequest::from_value(json!({})).unwrap();
    let result = svc_for(&server).get_tax(&request).await.unwrap();

    assert_eq!(first_key(&result), "error");
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn get_tax_with_overlong_tax_code_returns_avatax_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v2/transactions/createoradjust");
        then.status(400)
            .header("content-type", "application/json")
            .json_body(json!({
                "error": {
                    "code": "StringLengthError",
                    "message": "Field 'TaxCode' has an invalid length.",
                    "target": "IncorrectData",
                    "details": [{"code": "StringLengthError", "number": 14, "severity": "Error"}]
                }
            }));
    });

    let mut raw = request_hash();
    raw["createTransactionModel"]["lines"][0]["taxCode"] =
        json!("sdfsdfsdfsdfsdfsdfsdfsdfsdfsdfsdfsdfsdfsdf");
    let request = TransactionRequest::from_value(raw).unwrap();
    let result = svc_for(&server).get_tax(&request).await.unwrap();

    assert_eq!(first_key(&result), "error");
    assert_eq!(
        result.error_message().as_deref(),
        Some("Field 'TaxCode' has an invalid length.")
    );
}

#[tokio::test]
async fn cancel_tax_voids_under_configured_company() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v2/companies/SHOP1/transactions/testcancel-4711/void")
            .header("authorization", BASIC_AUTH)
            .json_body(json!({"code": "DocVoided"}));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"code": "testcancel-4711", "status": "Cancelled"}));
    });

    let result = svc_for(&server)
        .cancel_tax(Some("testcancel-4711"))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(result.status(), Some("Cancelled"));
}

#[tokio::test]
async fn cancel_tax_without_code_is_a_contract_violation() {
    let server = MockServer::start();
    let err = svc_for(&server).cancel_tax(None).await.unwrap_err();
    assert!(err.is_contract_violation());
    assert!(err.to_string().contains("transaction_code"));
}

#[tokio::test]
async fn ping_is_successful() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/utilities/ping")
            .header("authorization", BASIC_AUTH);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "version": "25.1.0",
                "authenticated": true,
                "authenticationType": "AccountIdLicenseKey",
                "authenticatedAccountId": 1100000000
            }));
    });

    let result = svc_for(&server).ping().await.unwrap();

    mock.assert();
    assert!(result.is_success());
}

#[tokio::test]
async fn ping_with_unauthenticated_response_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v2/utilities/ping");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"version": "25.1.0", "authenticated": false}));
    });

    let result = svc_for(&server).ping().await.unwrap();
    assert!(result.is_error());
}

#[tokio::test]
async fn validate_address_posts_the_address() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v2/addresses/resolve")
            .json_body(json!({
                "line1": "2000 Main Street",
                "city": "Irvine",
                "region": "CA",
                "postalCode": "92614",
                "country": "US"
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "validatedAddresses": [{"line1": "2000 MAIN ST", "postalCode": "92614-7202"}],
                "resolutionQuality": "Intersection"
            }));
    });

    let address = Address {
        line1: Some("2000 Main Street".to_owned()),
        city: Some("Irvine".to_owned()),
        region: Some("CA".to_owned()),
        postal_code: Some("92614".to_owned()),
        country: Some("US".to_owned()),
        ..Address::default()
    };
    let result = svc_for(&server).validate_address(&address).await.unwrap();

    mock.assert();
    assert!(result.is_success());
    assert_eq!(
        result.tax_result()["validatedAddresses"][0]["postalCode"],
        json!("92614-7202")
    );
}

#[tokio::test]
async fn validate_address_with_error_messages_is_still_a_success() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v2/addresses/resolve");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "address": {"line1": "1 Nowhere Lane", "postalCode": "00000"},
                "resolutionQuality": "NotCoded",
                "messages": [{
                    "summary": "The address is not deliverable.",
                    "refersTo": "Address",
                    "severity": "Error",
                    "source": "Avalara.AvaTax.Common"
                }]
            }));
    });

    let address = Address {
        line1: Some("1 Nowhere Lane".to_owned()),
        postal_code: Some("00000".to_owned()),
        ..Address::default()
    };
    let result = svc_for(&server).validate_address(&address).await.unwrap();

    assert!(result.is_success());
    assert_eq!(result.tax_result()["messages"][0]["severity"], json!("Error"));
}

#[tokio::test]
async fn get_tax_value_reports_null_lines_without_calling_avatax() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.any_request();
        then.status(500);
    });

    let result = svc_for(&server)
        .get_tax_value(json!({"createTransactionModel": {"code": "R1", "lines": null}}))
        .await
        .unwrap();

    assert_eq!(result.error_message().as_deref(), Some("lines required"));
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn get_tax_value_forwards_timestamp_date_unchanged() {
    let server = MockServer::start();
    let mut raw = request_hash();
    raw["createTransactionModel"]["date"] = json!("2024-03-01T10:00:00");
    raw["createTransactionModel"]["lines"][0]["number"] = json!(1);
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v2/transactions/createoradjust")
            .json_body(raw.clone());
        then.status(201)
            .header("content-type", "application/json")
            .json_body(json!({"code": "R123456789", "status": "Saved", "totalTax": 0.8}));
    });

    let result = svc_for(&server).get_tax_value(raw).await.unwrap();

    mock.assert();
    assert!(result.is_success());
}

#[tokio::test]
async fn validate_address_does_not_raise_on_garbage_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v2/addresses/resolve");
        then.status(502).body("<html>Bad Gateway</html>");
    });

    let result = svc_for(&server)
        .validate_address(&Address::default())
        .await
        .expect("must not raise when raise_exceptions is off");
    assert!(result.is_error());
    assert!(result.error_message().unwrap().contains("502"));
}

#[tokio::test]
async fn raise_exceptions_returns_transport_errors() {
    // Nothing listens on port 1.
    let mut config = AvaTaxConfig::new("user", "pass");
    config.endpoint = Some(Url::parse("http://127.0.0.1:1").unwrap());
    let svc = tax_svc(config, Arc::new(TaxSvcConfig::new(true, false)));

    let err = svc.validate_address(&Address::default()).await.unwrap_err();
    assert!(matches!(err, TaxError::Unexpected { transient: true, .. }));
    assert_eq!(err.retry_policy(), RetryPolicy::Retryable { after: None });
}

#[tokio::test]
async fn throttled_requests_carry_retry_after() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v2/utilities/ping");
        then.status(429)
            .header("content-type", "application/json")
            .header("retry-after", "3")
            .json_body(json!({"error": {"code": "TooManyRequests", "message": "slow down"}}));
    });
    let svc = tax_svc(config_for(&server), Arc::new(TaxSvcConfig::new(true, false)));

    let err = svc.ping().await.unwrap_err();
    assert_eq!(
        err.retry_policy(),
        RetryPolicy::Retryable {
            after: Some(Duration::from_secs(3))
        }
    );
}

#[tokio::test]
async fn slow_responses_time_out_into_error_results() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v2/utilities/ping");
        then.status(200)
            .delay(Duration::from_secs(2))
            .json_body(json!({"authenticated": true}));
    });
    let mut config = config_for(&server);
    config.timeout = Duration::from_millis(200);
    let svc = tax_svc(config, Arc::new(TaxSvcConfig::default()));

    let result = svc.ping().await.unwrap();
    assert!(result.is_error());
}
