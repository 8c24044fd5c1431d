//! Drives a claw server over a real loopback UDP socket.

use std::{net::UdpSocket, time::Duration};

use claw_lib::{
    build_servo_ctrl,
    claw_server::{ClawServer, ClawServerError},
    executor::ClawCtrl,
    params::ClawExecParams,
    registry::JointRegistry,
    servo_ctrl::SimDriver,
};
use comms_if::{
    eqpt::{JointId, JointState},
    tc::Response,
};

fn ctrl() -> ClawCtrl {
    let params: ClawExecParams =
        util::params::load_str(include_str!("../../params/claw_exec.toml")).unwrap();

    let servo_ctrl = build_servo_ctrl(SimDriver::new(), &params, Some).unwrap();
    let registry = JointRegistry::new(&params.joint_order(), Box::new(servo_ctrl)).unwrap();

    ClawCtrl::new(registry, params.home_on_activate)
}

struct Harness {
    server: ClawServer,
    client: UdpSocket,
    ctrl: ClawCtrl,
}

impl Harness {
    fn new() -> Self {
        let server = ClawServer::bind("127.0.0.1:0", Some(Duration::from_millis(500)), 1024).unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        client
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        client.connect(server.local_addr().unwrap()).unwrap();

        Self {
            server,
            client,
            ctrl: ctrl(),
        }
    }

    /// Send a raw datagram and return the raw reply after the server has handled it.
    fn send_raw(&mut self, bytes: &[u8]) -> (Result<bool, ClawServerError>, String) {
        self.client.send(bytes).unwrap();

        let served = self.server.serve_one(&mut self.ctrl);

        let mut buf = [0u8; 1024];
        let len = self.client.recv(&mut buf).unwrap();

        (served, String::from_utf8(buf[..len].to_vec()).unwrap())
    }

    fn send(&mut self, cmd: &str) -> String {
        let (served, reply) = self.send_raw(cmd.as_bytes());
        assert!(served.unwrap());
        reply
    }
}

#[test]
fn test_session_over_udp() {
    let mut h = Harness::new();

    assert!(h.send("home").starts_with("Error: "));
    assert_eq!(h.send("wakeup"), "OK");
    assert_eq!(h.send("claw open"), "OK");
    assert_eq!(h.send("base dec 100"), "OK");

    let state: JointState = h.send("state").parse().unwrap();
    assert_eq!(state.get(JointId::Claw), Some(180));
    assert_eq!(state.get(JointId::Base), Some(0));

    assert_eq!(
        Response::from_text(&h.send("base set 181")),
        Response::Err("Angle 181 is out of range, must be between 0 and 180".into())
    );

    // Still serving after errors
    assert_eq!(h.send("home"), "OK");
    assert_eq!(h.send("state"), "base:90;arm1:90;arm2:90;wrist:90;claw:0;");
}

#[test]
fn test_non_utf8_datagram() {
    let mut h = Harness::new();

    let (served, reply) = h.send_raw(&[0xff, 0xfe, 0x00]);

    assert!(matches!(served, Err(ClawServerError::NonUtf8Command(_))));
    assert!(reply.starts_with("Error: "));

    assert_eq!(h.send("wakeup"), "OK");
}

#[test]
fn test_recv_timeout() {
    let mut server = ClawServer::bind("127.0.0.1:0", Some(Duration::from_millis(20)), 64).unwrap();
    let mut ctrl = ctrl();

    assert!(!server.serve_one(&mut ctrl).unwrap());
}
