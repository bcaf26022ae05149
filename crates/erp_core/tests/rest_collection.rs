use erp_core::domain::schemas;
use erp_core::remote::resources;
use erp_core::{
    fields_from_value, profile_for_resource, ApiClient, ApiConfig, CollectionRepository,
    EntityService, ManualClock, RecordFilter, RecordId, RemoteError, RepoError, RestCollection,
    ToastChannel, ToastKind,
};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// Canned HTTP/1.1 collaborator answering one connection per response.
struct FakeApi {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    worker: JoinHandle<()>,
}

impl FakeApi {
    fn serve(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/api", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        let worker = std::thread::spawn(move || {
            for (code, body) in responses {
                let (stream, _) = listener.accept().unwrap();
                let request = read_request(&stream);
                seen.lock().unwrap().push(request);
                write_response(stream, code, body);
            }
        });

        Self {
            base_url,
            requests,
            worker,
        }
    }

    fn client(&self) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: self.base_url.clone(),
            connect_timeout_ms: 1_000,
            request_timeout_ms: 2_000,
        })
    }

    fn finish(self) -> Vec<String> {
        self.worker.join().unwrap();
        let requests = self.requests.lock().unwrap();
        requests.clone()
    }
}

fn read_request(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();

    let mut content_length = 0;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).unwrap();
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).unwrap();
    let body = String::from_utf8(body).unwrap();
    format!("{} {}", request_line.trim_end(), body).trim_end().to_string()
}

fn request_body(request: &str) -> Value {
    let (_, body) = request.split_once("HTTP/1.1 ").unwrap();
    serde_json::from_str(body).unwrap()
}

fn write_response(mut stream: TcpStream, code: u16, body: &str) {
    let reason = if (200..300).contains(&code) { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {code} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).unwrap();
    stream.flush().unwrap();
}

#[test]
fn list_accepts_bare_array_and_data_envelope() {
    let api = FakeApi::serve(vec![
        (200, r#"[{"id":1,"firstName":"Ada"},{"id":2,"firstName":"Grace"}]"#),
        (200, r#"{"data":[{"id":"e-3","firstName":"Linus"}],"total":1}"#),
    ]);
    let client = api.client();
    let employees = RestCollection::new(&client, resources::EMPLOYEES);

    let first = employees.list(&RecordFilter::new()).unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].id.as_str(), "1");
    assert_eq!(first[1].field("firstName"), Some(&json!("Grace")));

    let second = employees.list(&RecordFilter::new()).unwrap();
    assert_eq!(second[0].id.as_str(), "e-3");

    let requests = api.finish();
    assert!(requests[0].starts_with("GET /api/employees HTTP/1.1"));
}

#[test]
fn list_filters_are_sent_and_reapplied_locally() {
    let api = FakeApi::serve(vec![(
        200,
        r#"[{"id":"a","status":"pending"},{"id":"b","status":"approved"}]"#,
    )]);
    let client = api.client();
    let leave = RestCollection::new(&client, resources::LEAVE_REQUESTS);

    let pending = leave
        .list(&RecordFilter::new().where_eq("status", "pending"))
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id.as_str(), "a");

    let requests = api.finish();
    assert!(requests[0].starts_with("GET /api/leave-requests?status=pending HTTP/1.1"));
}

#[test]
fn create_update_delete_use_resource_routes() {
    let api = FakeApi::serve(vec![
        (201, r#"{"id":"as-1","name":"Laptop","createdAt":"2024-01-01T00:00:00.000Z"}"#),
        (200, r#"{"data":{"id":"as-1","name":"Laptop Pro"}}"#),
        (204, ""),
    ]);
    let client = api.client();
    let assets = RestCollection::new(&client, resources::ASSETS);

    let created = assets
        .create(fields_from_value(json!({ "name": "Laptop" })).unwrap())
        .unwrap();
    assert_eq!(created.id.as_str(), "as-1");
    assert_eq!(created.created_at.as_deref(), Some("2024-01-01T00:00:00.000Z"));

    let updated = assets
        .update(
            &created.id,
            fields_from_value(json!({ "name": "Laptop Pro" })).unwrap(),
        )
        .unwrap();
    assert_eq!(updated.field("name"), Some(&json!("Laptop Pro")));

    assets.delete(&created.id).unwrap();

    let requests = api.finish();
    assert_eq!(requests[0], r#"POST /api/assets HTTP/1.1 {"name":"Laptop"}"#);
    assert_eq!(requests[1], r#"PUT /api/assets/as-1 HTTP/1.1 {"name":"Laptop Pro"}"#);
    assert_eq!(requests[2], "DELETE /api/assets/as-1 HTTP/1.1");
}

#[test]
fn not_found_on_id_routes() {
    let api = FakeApi::serve(vec![
        (404, r#"{"message":"Employee not found"}"#),
        (404, r#"{"message":"Employee not found"}"#),
        (404, ""),
    ]);
    let client = api.client();
    let employees = RestCollection::new(&client, resources::EMPLOYEES);
    let id = RecordId::parse("e-404").unwrap();

    assert!(employees.get(&id).unwrap().is_none());
    let err = employees
        .update(&id, fields_from_value(json!({ "firstName": "x" })).unwrap())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(ref missing) if missing == &id));
    assert!(employees.delete(&id).unwrap_err().is_not_found());

    api.finish();
}

#[test]
fn server_error_keeps_status_and_body() {
    let api = FakeApi::serve(vec![(500, r#"{"message":"database offline"}"#)]);
    let client = api.client();
    let departments = RestCollection::new(&client, resources::DEPARTMENTS);

    let err = departments.list(&RecordFilter::new()).unwrap_err();
    match err {
        RepoError::Remote(RemoteError::Status { code, body }) => {
            assert_eq!(code, 500);
            assert!(body.contains("database offline"));
        }
        other => panic!("unexpected error: {other}"),
    }

    api.finish();
}

#[test]
fn unreachable_collaborator_is_a_transport_error_and_lists_empty() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = ApiClient::new(&ApiConfig {
        base_url: format!("http://127.0.0.1:{port}/api/"),
        connect_timeout_ms: 500,
        request_timeout_ms: 500,
    });
    let employees = RestCollection::new(&client, resources::EMPLOYEES);

    let err = employees.list(&RecordFilter::new()).unwrap_err();
    assert!(matches!(err, RepoError::Remote(RemoteError::Transport(_))));
    assert!(employees.list_or_empty(&RecordFilter::new()).is_empty());
}

#[test]
fn custom_actions_hit_nested_routes() {
    let api = FakeApi::serve(vec![
        (200, r#"{"id":"t-1","employeeId":"e-1","clockIn":"09:00"}"#),
        (200, r#"{"id":"as-9","assignedTo":"e-1"}"#),
        (404, ""),
    ]);
    let client = api.client();
    let time_entries = RestCollection::new(&client, resources::TIME_ENTRIES);
    let assets = RestCollection::new(&client, resources::ASSETS);
    let asset_id = RecordId::parse("as-9").unwrap();

    let started = time_entries
        .post_action("start", &json!({ "employeeId": "e-1" }))
        .unwrap();
    assert_eq!(started["id"], json!("t-1"));

    let assigned = assets
        .patch_record_action(&asset_id, "assign", &json!({ "employeeId": "e-1" }))
        .unwrap();
    assert_eq!(assigned["assignedTo"], json!("e-1"));

    let missing = RecordId::parse("as-0").unwrap();
    assert!(assets
        .patch_record_action(&missing, "return", &json!({}))
        .unwrap_err()
        .is_not_found());

    let requests = api.finish();
    assert!(requests[0].starts_with("POST /api/time-entries/start HTTP/1.1"));
    assert!(requests[1].starts_with("PATCH /api/assets/as-9/assign HTTP/1.1"));
    assert!(requests[2].starts_with("PATCH /api/assets/as-0/return HTTP/1.1"));
}

#[test]
fn service_over_rest_reports_load_failure() {
    let api = FakeApi::serve(vec![(503, "")]);
    let client = api.client();
    let channel = ToastChannel::new(Rc::new(ManualClock::new(0)));
    let service = EntityService::new(
        RestCollection::new(&client, resources::EMPLOYEES),
        schemas::employee(),
        channel.clone(),
    );

    assert!(service.list(&RecordFilter::new()).is_empty());
    let active = channel.active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].kind, ToastKind::Error);
    assert_eq!(active[0].message, "Failed to load employee records");

    api.finish();
}

#[test]
fn asset_service_sends_depreciation_on_create_and_update() {
    let stored = r#"{"id":"as-7","name":"Forklift","purchaseCost":12000,"salvageValue":2000,"usefulLifeYears":4,"yearsInService":1,"annualDepreciation":2500.0,"accumulatedDepreciation":2500.0,"bookValue":9500.0}"#;
    let api = FakeApi::serve(vec![
        (201, stored),
        (200, stored),
        (200, r#"{"id":"as-7","name":"Forklift","yearsInService":3,"bookValue":4500.0}"#),
    ]);
    let client = api.client();
    let channel = ToastChannel::new(Rc::new(ManualClock::new(0)));
    let service = EntityService::from_profile(
        RestCollection::new(&client, resources::ASSETS),
        profile_for_resource(resources::ASSETS).unwrap(),
        channel.clone(),
    );

    let created = service
        .create(
            fields_from_value(json!({
                "name": "Forklift",
                "purchaseCost": 12000,
                "salvageValue": 2000,
                "usefulLifeYears": 4,
                "yearsInService": 1
            }))
            .unwrap(),
        )
        .unwrap();
    let updated = service
        .update(
            &created.id,
            fields_from_value(json!({ "yearsInService": 3 })).unwrap(),
        )
        .unwrap();
    assert_eq!(updated.field("bookValue"), Some(&json!(4500.0)));

    let requests = api.finish();
    assert!(requests[0].starts_with("POST /api/assets HTTP/1.1"));
    let posted = request_body(&requests[0]);
    assert_eq!(posted["annualDepreciation"], json!(2500.0));
    assert_eq!(posted["bookValue"], json!(9500.0));

    assert!(requests[1].starts_with("GET /api/assets/as-7 HTTP/1.1"));
    assert!(requests[2].starts_with("PUT /api/assets/as-7 HTTP/1.1"));
    assert_eq!(
        request_body(&requests[2]),
        json!({
            "yearsInService": 3,
            "accumulatedDepreciation": 7500.0,
            "bookValue": 4500.0
        })
    );
    assert_eq!(
        channel.active()[1].message,
        "Asset updated successfully".to_string()
    );
}
