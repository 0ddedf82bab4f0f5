//! Minimal HTTP/1.1 stand-in for the provider: canned reply per path, every
//! request recorded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use mealcard_client::{Session, SessionConfig, http_client_builder};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub target: String,
    /// Lower-cased header names
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub set_cookie: Option<String>,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Reply {
            status,
            body: body.to_string(),
            set_cookie: None,
        }
    }

    pub fn with_cookie(mut self, cookie: &str) -> Self {
        self.set_cookie = Some(cookie.to_string());
        self
    }
}

pub const LOGIN_PATH: &str = "/api/authenticate/default";
pub const MOVEMENTS_PATH: &str = "/api/protected/card/537781/accountmovement";

pub struct Stub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Stub {
    pub async fn start(routes: Vec<(&'static str, Reply)>) -> Stub {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<HashMap<&'static str, Reply>> = Arc::new(routes.into_iter().collect());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let routes = routes.clone();
                let seen = seen.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, &routes, &seen).await;
                });
            }
        });

        Stub {
            base_url: format!("http://{addr}/api"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// A session against this stub, configured like the real one but
    /// ignoring any proxy set in the environment.
    pub fn session(&self) -> Session {
        let client = http_client_builder().no_proxy().build().unwrap();
        Session::with_client(
            SessionConfig {
                base_url: self.base_url.clone(),
                card_id: "537781".to_string(),
            },
            client,
        )
    }
}

async fn serve(
    mut stream: TcpStream,
    routes: &HashMap<&'static str, Reply>,
    seen: &Mutex<Vec<Recorded>>,
) -> std::io::Result<()> {
    let Some(request) = read_request(&mut stream).await? else {
        return Ok(());
    };
    let path = request.target.split('?').next().unwrap_or_default().to_string();
    seen.lock().unwrap().push(request);

    let reply = routes
        .get(path.as_str())
        .cloned()
        .unwrap_or_else(|| Reply::json(404, "{}"));

    let mut head = format!(
        "HTTP/1.1 {} Stub\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n",
        reply.status,
        reply.body.len()
    );
    if let Some(cookie) = &reply.set_cookie {
        head.push_str(&format!("Set-Cookie: {cookie}\r\n"));
    }
    head.push_str("\r\n");

    stream.write_all(head.as_bytes()).await?;
    stream.write_all(reply.body.as_bytes()).await?;
    stream.shutdown().await
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<Option<Recorded>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let len: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < len {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(len);

    Ok(Some(Recorded {
        method,
        target,
        headers,
        body,
    }))
}

pub fn login_ok(token: &str) -> Reply {
    Reply::json(
        200,
        &format!(
            concat!(
                r#"{{"data":{{"token":"{token}","onBoardApplied":true,"#,
                r#""customer":{{"id":1,"name":"Ana Silva","birthDate":null}}}},"#,
                r#""message":[]}}"#,
            ),
            token = token
        ),
    )
}

pub fn movement(name: &str, amount: f64, balance: f64) -> String {
    format!(
        concat!(
            r#"{{"transactionDate":"2020-03-02T12:31:00","transactionType":1,"#,
            r#""transactionName":"{name}","amount":{amount},"mcc":"5812","#,
            r#""category":{{"id":5,"description":"Restauracao"}},"#,
            r#""categoryId":null,"balance":{balance}}}"#,
        ),
        name = name,
        amount = amount,
        balance = balance
    )
}

pub fn movements_ok(balance: &str, movements: &[String]) -> Reply {
    Reply::json(
        200,
        &format!(
            concat!(
                r#"{{"data":{{"account":{{"iban":null,"cardNumber":"5377 81** **** 1234","#,
                r#""availableBalance":{balance},"cardHolderFirstName":"Ana","#,
                r#""cardHolderLastName":"Silva","cardActivated":true}},"#,
                r#""movementList":[{list}]}},"message":[]}}"#,
            ),
            balance = balance,
            list = movements.join(",")
        ),
    )
}
