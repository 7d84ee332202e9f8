#![allow(dead_code)]

pub mod mock_backend;

use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;
use std::{env, fs, thread};
use tempfile::TempDir;

/// A `flashgen serve` daemon isolated in its own temp dirs
pub struct TestContext {
    pub temp_dir: TempDir,
    pub child: Child,
    pub socket_path: PathBuf,
    user: String,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let bin_path = env!("CARGO_BIN_EXE_flashgen");

        fs::create_dir_all(temp_dir.path().join("config")).expect("Failed to create config dir");
        fs::create_dir_all(temp_dir.path().join("data")).expect("Failed to create data dir");

        // Unique user name per run keeps socket paths apart
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        let user = format!("flashgen_test_{}", nanos);

        let child = isolated(Command::new(bin_path), &temp_dir, &user)
            .arg("serve")
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .expect("Failed to spawn flashgen daemon");

        let socket_path = PathBuf::from(format!("/tmp/flashgen-{}.sock", user));

        let ctx = TestContext {
            temp_dir,
            child,
            socket_path,
            user,
        };

        ctx.wait_for_socket();
        ctx
    }

    /// Run a one-shot CLI command against the same config and data dirs
    pub fn cli(&self, args: &[&str]) -> Output {
        isolated(
            Command::new(env!("CARGO_BIN_EXE_flashgen")),
            &self.temp_dir,
            &self.user,
        )
        .args(args)
        .output()
        .expect("Failed to run flashgen")
    }

    fn wait_for_socket(&self) {
        let start = std::time::Instant::now();
        while start.elapsed() < Duration::from_secs(5) {
            if self.socket_path.exists() {
                // Permissions are applied right after bind
                thread::sleep(Duration::from_millis(100));
                return;
            }
            thread::sleep(Duration::from_millis(100));
        }
        panic!("Timed out waiting for socket at {:?}", self.socket_path);
    }
}

fn isolated(mut command: Command, temp_dir: &TempDir, user: &str) -> Command {
    command
        .env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .env("XDG_DATA_HOME", temp_dir.path().join("data"))
        .env("FLASHGEN_CONFIG", temp_dir.path().join("config/flashgen.json"))
        .env("USER", user)
        .env_remove("ANTHROPIC_API_KEY");
    command
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = fs::remove_file(&self.socket_path);
    }
}
