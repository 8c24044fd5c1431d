//! # Claw Command Line
//!
//! Sends text commands to the claw executable over UDP and prints the responses. With a command on
//! the command line it is sent once, otherwise an interactive prompt is started.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use comms_if::{
    eqpt::{JointId, JointState},
    tc::Response,
};
use log::{debug, warn};
use rustyline::{error::ReadlineError, DefaultEditor};
use serde::Serialize;
use std::{
    io,
    net::UdpSocket,
    path::Path,
    time::Duration,
};
use structopt::StructOpt;
use util::logger::{logger_init_stderr, LevelFilter};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const PROMPT: &str = "Claw $ ";
const HISTORY_PATH: &str = "data/claw_history.txt";

/// Largest response the claw sends.
///
/// Units: bytes
const MAX_RESPONSE_LEN: usize = 1024;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "claw_cli", about = "Send commands to the claw arm")]
struct Opt {
    /// Address of the claw executable
    #[structopt(short, long, default_value = "127.0.0.1:8889")]
    endpoint: String,

    /// Time to wait for a response
    #[structopt(short, long, default_value = "2000")]
    timeout_ms: u64,

    /// Print state responses as JSON
    #[structopt(long)]
    json: bool,

    /// Log debug information to stderr
    #[structopt(short, long)]
    verbose: bool,

    /// Command to send, for example `arm1 inc 10`. Starts a prompt if empty.
    command: Vec<String>,
}

/// UDP client for the claw command protocol.
struct ClawClient {
    socket: UdpSocket,
}

/// One joint of a state response, as printed in JSON.
#[derive(Serialize)]
struct JointEntry {
    joint: JointId,
    angle_deg: u8,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    if opt.verbose {
        logger_init_stderr(LevelFilter::Debug).wrap_err("Failed to initialise logging")?;
    }

    let client = ClawClient::new(&opt.endpoint, Duration::from_millis(opt.timeout_ms))
        .wrap_err_with(|| format!("Could not open a socket to {}", opt.endpoint))?;

    if opt.command.is_empty() {
        return repl(&client, opt.json);
    }

    let response = client.send(&opt.command.join(" "))?;
    println!("{}", format_response(&response, opt.json)?);

    match response {
        Response::Ok(_) => Ok(()),
        Response::Err(msg) => Err(eyre!("Command failed: {}", msg)),
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ClawClient {
    fn new(endpoint: &str, timeout: Duration) -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_read_timeout(Some(timeout))?;
        socket.connect(endpoint)?;

        Ok(Self { socket })
    }

    /// Send a command and wait for the response.
    fn send(&self, cmd: &str) -> Result<Response> {
        debug!("Sending {:?}", cmd);
        self.socket.send(cmd.as_bytes())?;

        let mut buf = [0u8; MAX_RESPONSE_LEN];
        let len = match self.socket.recv(&mut buf) {
            Ok(l) => l,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Err(eyre!("No response from claw"))
            }
            Err(e) => return Err(e).wrap_err("Could not recieve the response"),
        };

        let text = String::from_utf8_lossy(&buf[..len]);
        debug!("Recieved {:?}", text);

        Ok(Response::from_text(&text))
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Run the interactive prompt until interrupted.
fn repl(client: &ClawClient, json: bool) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    if rl.load_history(HISTORY_PATH).is_err() {
        println!("No history detected");
    }

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                rl.add_history_entry(line.as_str())?;

                match client.send(&line).and_then(|r| format_response(&r, json)) {
                    Ok(s) => println!("{}", s),
                    Err(e) => println!("{}", e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Unhandled Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(dir) = Path::new(HISTORY_PATH).parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!("Could not create the history directory: {}", e);
        }
    }
    if let Err(e) = rl.save_history(HISTORY_PATH) {
        warn!("Could not save history: {}", e);
    }

    println!("Exiting...");
    Ok(())
}

/// Format a response for printing.
///
/// State snapshots are printed as JSON when requested, everything else as sent by the claw.
fn format_response(response: &Response, json: bool) -> Result<String> {
    if let (true, Response::Ok(payload)) = (json, response) {
        if let Ok(state) = payload.parse::<JointState>() {
            let entries: Vec<JointEntry> = state
                .angles_deg
                .into_iter()
                .map(|(joint, angle_deg)| JointEntry { joint, angle_deg })
                .collect();

            return Ok(serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(response.to_string())
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn test_format_response() {
        let state = Response::Ok("base:90;claw:180;".into());

        assert_eq!(format_response(&state, false).unwrap(), "base:90;claw:180;");

        let json: serde_json::Value =
            serde_json::from_str(&format_response(&state, true).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"joint": "base", "angle_deg": 90},
                {"joint": "claw", "angle_deg": 180}
            ])
        );

        // Non-state payloads are left alone
        assert_eq!(format_response(&Response::ok(), true).unwrap(), "OK");
        assert_eq!(
            format_response(&Response::Err("nope".into()), true).unwrap(),
            "Error: nope"
        );
    }

    #[test]
    fn test_send_and_timeout() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = server.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let mut buf = [0u8; 64];
            let (len, src) = server.recv_from(&mut buf).unwrap();
            assert_eq!(&buf[..len], b"wakeup");
            server.send_to(b"OK", src).unwrap();
        });

        let client = ClawClient::new(&addr.to_string(), Duration::from_millis(2000)).unwrap();
        assert_eq!(client.send("wakeup").unwrap(), Response::ok());
        handle.join().unwrap();

        // A socket which never answers
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let client = ClawClient::new(
            &silent.local_addr().unwrap().to_string(),
            Duration::from_millis(50),
        )
        .unwrap();
        let err = client.send("state").unwrap_err();
        assert_eq!(err.to_string(), "No response from claw");
    }
}
