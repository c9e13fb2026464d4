use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;

use serde_json::Value;
use taglink_frame::Frame;

fn unique_config_file(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "taglink-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir.join("settings.json")
}

/// Bind a loopback listener and run `script` against the first connection.
fn spawn_device<T, F>(script: F) -> (u16, thread::JoinHandle<T>)
where
    F: FnOnce(TcpStream) -> T + Send + 'static,
    T: Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let port = listener
        .local_addr()
        .expect("listener should have an address")
        .port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("device should accept");
        script(stream)
    });
    (port, handle)
}

/// Read one request frame: a fixed header, then LEN more payload bytes plus
/// the footer.
fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut header = [0u8; 4];
    stream
        .read_exact(&mut header)
        .expect("request header should arrive");
    let len = header[3] as usize;
    let mut rest = vec![0u8; len + 3];
    stream
        .read_exact(&mut rest)
        .expect("request body should arrive");
    let mut frame = header.to_vec();
    frame.extend_from_slice(&rest);
    frame
}

fn reply(command: u8, payload: &[u8]) -> Vec<u8> {
    Frame::new(0x00, command, payload.to_vec())
        .encode()
        .expect("reply should encode")
        .to_vec()
}

fn run_taglink(config: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_taglink"))
        .env("TAGLINK_CONFIG", config)
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("taglink should run")
}

#[test]
fn version_prints_parsed_rom_version_and_stores_the_address() {
    let config = unique_config_file("version");
    let (port, device) = spawn_device(|mut stream| {
        let request = read_request(&mut stream);
        let rom = [0x90, b'1', b'0', b'2', b'3', b'N', b'E', b'T', b'0', b'1'];
        stream
            .write_all(&reply(0x4F, &rom))
            .expect("device should write the reply");
        request
    });

    let addr = format!("127.0.0.1:{port}");
    let output = run_taglink(&config, &["--format", "json", "version", &addr]);

    let request = device.join().expect("device thread should complete");
    assert_eq!(request, [0x02, 0x00, 0x4F, 0x01, 0x90, 0x03, 0xE5, 0x0D]);

    assert_eq!(output.status.code(), Some(0), "stderr: {:?}", output.stderr);
    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    let parsed: Value = serde_json::from_str(stdout.trim()).expect("stdout should be json");
    assert_eq!(parsed["display"], "1.02.3 NET01");
    assert_eq!(parsed["series"], "NET");

    let stored = fs::read_to_string(&config).expect("settings should be written");
    let stored: Value = serde_json::from_str(&stored).expect("settings should be json");
    assert_eq!(stored["device"]["host"], "127.0.0.1");
    assert_eq!(stored["device"]["port"], u64::from(port));
}

#[test]
fn inventory_lists_announced_tags() {
    let config = unique_config_file("inventory");
    let (port, device) = spawn_device(|mut stream| {
        let mode_req = read_request(&mut stream);
        stream
            .write_all(&reply(0x4E, &[]))
            .expect("device should ack command mode");

        let antenna_req = read_request(&mut stream);
        stream
            .write_all(&reply(0x4E, &[]))
            .expect("device should ack the antenna select");

        let inv_req = read_request(&mut stream);
        let mut burst = reply(0x78, &[0xF0, 0x02]);
        burst.extend(reply(
            0x49,
            &[0x00, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0x04, 0xE0],
        ));
        burst.extend(reply(
            0x49,
            &[0x00, 0x02, 0x23, 0x45, 0x67, 0x89, 0xAB, 0x04, 0xE0],
        ));
        stream
            .write_all(&burst)
            .expect("device should announce and stream tags");

        let buzzer_req = read_request(&mut stream);
        stream
            .write_all(&reply(0x42, &[]))
            .expect("device should ack the buzzer");

        (mode_req, antenna_req, inv_req, buzzer_req)
    });

    let addr = format!("127.0.0.1:{port}");
    let output = run_taglink(&config, &["--format", "json", "inventory", &addr]);

    let (mode_req, antenna_req, inv_req, buzzer_req) =
        device.join().expect("device thread should complete");
    assert_eq!(mode_req[2], 0x4E);
    assert_eq!(&mode_req[4..8], [0x00, 0x00, 0x00, 0x1C]);
    assert_eq!(antenna_req[2], 0x4E);
    assert_eq!(&antenna_req[4..6], [0x9C, 0x00]);
    assert_eq!(inv_req[2], 0x78);
    assert_eq!(&inv_req[4..7], [0xF0, 0x40, 0x01]);
    assert_eq!(buzzer_req[2], 0x42);
    assert_eq!(&buzzer_req[4..6], [0x01, 0x00]);

    assert_eq!(output.status.code(), Some(0), "stderr: {:?}", output.stderr);
    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    let parsed: Value = serde_json::from_str(stdout.trim()).expect("stdout should be json");
    assert_eq!(parsed["count"], 2);
    assert_eq!(parsed["tags"][0]["antenna"], 0);
    assert_eq!(parsed["tags"][0]["uid"], "E0 04 AB 89 67 45 23 01");
    assert_eq!(parsed["tags"][1]["uid"], "E0 04 AB 89 67 45 23 02");
}

#[test]
fn send_transmits_raw_hex_and_prints_the_reply() {
    let config = unique_config_file("send");
    let (port, device) = spawn_device(|mut stream| {
        let request = read_request(&mut stream);
        stream
            .write_all(&reply(0x4E, &[]))
            .expect("device should ack");
        request
    });

    let addr = format!("127.0.0.1:{port}");
    let output = run_taglink(
        &config,
        &[
            "--format",
            "json",
            "send",
            &addr,
            "--cmd",
            "0x4E",
            "--data",
            "9C 01",
        ],
    );

    let request = device.join().expect("device thread should complete");
    let expected = Frame::new(0x00, 0x4E, vec![0x9C, 0x01])
        .encode()
        .expect("expected frame should encode");
    assert_eq!(request, expected.to_vec());

    assert_eq!(output.status.code(), Some(0), "stderr: {:?}", output.stderr);
    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    let parsed: Value = serde_json::from_str(stdout.trim()).expect("stdout should be json");
    assert_eq!(parsed["command"], "0x4E");
    assert_eq!(parsed["payload_size"], 0);
}

#[test]
fn stored_address_is_used_when_none_is_given() {
    let config = unique_config_file("stored");
    let (port, device) = spawn_device(|mut stream| {
        let _ = read_request(&mut stream);
        let rom = [0x90, b'2', b'1', b'0', b'0', b'N', b'E', b'T', b'0', b'2'];
        stream
            .write_all(&reply(0x4F, &rom))
            .expect("device should write the reply");
    });

    fs::write(
        &config,
        format!("{{\"device\":{{\"host\":\"127.0.0.1\",\"port\":{port}}}}}"),
    )
    .expect("settings should be writable");

    let output = run_taglink(&config, &["--format", "json", "version"]);
    device.join().expect("device thread should complete");

    assert_eq!(output.status.code(), Some(0), "stderr: {:?}", output.stderr);
    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    let parsed: Value = serde_json::from_str(stdout.trim()).expect("stdout should be json");
    assert_eq!(parsed["display"], "2.10.0 NET02");
}

#[test]
fn missing_address_without_stored_settings_is_a_usage_error() {
    let config = unique_config_file("no-addr");

    let output = run_taglink(&config, &["version"]);

    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8(output.stderr).expect("stderr should be utf-8");
    assert!(stderr.contains("no device address"), "stderr: {stderr}");
}

#[test]
fn silent_device_exits_with_the_timeout_code() {
    let config = unique_config_file("silent");
    let (port, device) = spawn_device(|mut stream| {
        let _ = read_request(&mut stream);
        // Hold the connection open, replying with nothing, until the
        // client gives up and disconnects.
        let mut sink = Vec::new();
        let _ = stream.read_to_end(&mut sink);
    });

    let addr = format!("127.0.0.1:{port}");
    let output = run_taglink(
        &config,
        &["version", &addr, "--timeout", "100ms", "--retries", "0"],
    );

    assert_eq!(output.status.code(), Some(124), "stderr: {:?}", output.stderr);
    device.join().expect("device thread should complete");
}

#[test]
fn monitor_prints_unsolicited_frames_up_to_count() {
    let config = unique_config_file("monitor");
    let (port, device) = spawn_device(|mut stream| {
        let mut burst = reply(0x49, &[0x00, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0x04, 0xE0]);
        burst.extend(reply(
            0x49,
            &[0x07, 0x02, 0x23, 0x45, 0x67, 0x89, 0xAB, 0x04, 0xE0],
        ));
        stream
            .write_all(&burst)
            .expect("device should stream frames");
        let mut sink = Vec::new();
        let _ = stream.read_to_end(&mut sink);
    });

    let addr = format!("127.0.0.1:{port}");
    let output = run_taglink(
        &config,
        &["--format", "json", "monitor", &addr, "--count", "2"],
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {:?}", output.stderr);
    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let parsed: Value = serde_json::from_str(line).expect("each line should be json");
        assert_eq!(parsed["command"], "0x49");
        assert_eq!(parsed["payload_size"], 9);
    }
    device.join().expect("device thread should complete");
}
