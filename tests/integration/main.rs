//! Integration tests for depcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// depcache with config, local discovery and cache root isolated to `home`
    fn depcache(home: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("depcache");
        cmd.env("DEPCACHE_CONFIG", home.path().join("config.toml"))
            .env("DEPCACHE_CACHE_DIR", home.path().join("cache"))
            .env_remove("DEPCACHE_FORCE_REFRESH")
            .arg("--no-local");
        cmd
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        depcache(&home)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("skip dependency installs"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        depcache(&home)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("depcache"));
    }

    #[test]
    fn managers_lists_registry() {
        let home = TempDir::new().unwrap();
        depcache(&home)
            .arg("managers")
            .assert()
            .success()
            .stdout(predicate::str::contains("npm"))
            .stdout(predicate::str::contains("bower_components"))
            .stdout(predicate::str::contains("composer.json"));
    }

    #[test]
    fn install_without_manifests_is_noop() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        depcache(&home)
            .current_dir(project.path())
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("Nothing to install"));
    }

    #[test]
    fn install_unknown_manager_fails() {
        let home = TempDir::new().unwrap();
        depcache(&home)
            .args(["install", "gradle"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown package manager: gradle"));
    }

    #[test]
    fn cache_list_empty() {
        let home = TempDir::new().unwrap();
        depcache(&home)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache entries"));
    }

    #[test]
    fn cache_list_json_empty() {
        let home = TempDir::new().unwrap();
        depcache(&home)
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn config_path() {
        let home = TempDir::new().unwrap();
        depcache(&home)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        depcache(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("effective cache root"));
    }

    #[test]
    fn invalid_config_fails() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join("config.toml"), "[cache\n").unwrap();
        depcache(&home)
            .arg("managers")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}

#[cfg(unix)]
mod install_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A project plus a fake `npm` on PATH that counts its installs
    struct Sandbox {
        root: TempDir,
    }

    impl Sandbox {
        fn new(install_exit_code: i32) -> Self {
            let root = TempDir::new().unwrap();
            let bin = root.path().join("bin");
            fs::create_dir_all(&bin).unwrap();
            fs::create_dir_all(root.path().join("project")).unwrap();

            let script = format!(
                r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "10.0.0"
  exit 0
fi
echo "install" >> "{count}"
mkdir -p node_modules/left-pad
cat package.json > node_modules/left-pad/index.js
exit {code}
"#,
                count = root.path().join("installs").display(),
                code = install_exit_code
            );
            let npm = bin.join("npm");
            fs::write(&npm, script).unwrap();
            fs::set_permissions(&npm, fs::Permissions::from_mode(0o755)).unwrap();

            Self { root }
        }

        fn project(&self) -> PathBuf {
            self.root.path().join("project")
        }

        fn cache(&self) -> PathBuf {
            self.root.path().join("cache")
        }

        fn installs(&self) -> usize {
            fs::read_to_string(self.root.path().join("installs"))
                .map(|s| s.lines().count())
                .unwrap_or(0)
        }

        fn write_manifest(&self, contents: &str) {
            fs::write(self.project().join("package.json"), contents).unwrap();
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("depcache");
            cmd.current_dir(self.project())
                .env("PATH", format!("{}:/usr/bin:/bin", self.root.path().join("bin").display()))
                .env("DEPCACHE_CONFIG", self.root.path().join("config.toml"))
                .env("DEPCACHE_CACHE_DIR", self.cache())
                .env_remove("DEPCACHE_FORCE_REFRESH")
                .arg("--no-local");
            cmd
        }
    }

    fn archives(cache: &Path) -> usize {
        let dir = cache.join("npm").join("10.0.0");
        fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[test]
    fn miss_then_hit_then_restore() {
        let sb = Sandbox::new(0);
        sb.write_manifest(r#"{"dependencies":{"left-pad":"1.3.0"}}"#);

        sb.cmd()
            .args(["install", "npm"])
            .assert()
            .success()
            .stdout(predicate::str::contains("installed and cached"));
        assert_eq!(sb.installs(), 1);
        assert_eq!(archives(&sb.cache()), 1);

        sb.cmd()
            .args(["install", "npm"])
            .assert()
            .success()
            .stdout(predicate::str::contains("up to date"));
        assert_eq!(sb.installs(), 1);

        fs::remove_dir_all(sb.project().join("node_modules")).unwrap();
        sb.cmd()
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("restored from cache"));
        assert_eq!(sb.installs(), 1);
        assert_eq!(
            fs::read_to_string(sb.project().join("node_modules/left-pad/index.js")).unwrap(),
            r#"{"dependencies":{"left-pad":"1.3.0"}}"#
        );
    }

    #[test]
    fn manifest_change_adds_archive() {
        let sb = Sandbox::new(0);
        sb.write_manifest(r#"{"v":1}"#);
        sb.cmd().args(["install", "npm"]).assert().success();

        sb.write_manifest(r#"{"v":2}"#);
        sb.cmd()
            .args(["install", "npm"])
            .assert()
            .success()
            .stdout(predicate::str::contains("installed and cached"));

        assert_eq!(sb.installs(), 2);
        assert_eq!(archives(&sb.cache()), 2);
    }

    #[test]
    fn force_refresh_reinstalls() {
        let sb = Sandbox::new(0);
        sb.write_manifest(r#"{"v":1}"#);
        sb.cmd().args(["install", "npm"]).assert().success();

        sb.cmd()
            .args(["install", "npm", "--force-refresh"])
            .assert()
            .success()
            .stdout(predicate::str::contains("installed and cached"));
        assert_eq!(sb.installs(), 2);
    }

    #[test]
    fn hash_reports_cache_state() {
        let sb = Sandbox::new(0);
        sb.write_manifest(r#"{"v":1}"#);

        sb.cmd()
            .args(["hash", "npm"])
            .assert()
            .success()
            .stdout(predicate::str::contains("missing"));

        sb.cmd().args(["install", "npm"]).assert().success();

        sb.cmd()
            .args(["hash", "npm"])
            .assert()
            .success()
            .stdout(predicate::str::contains(".tar.gz cached"));
    }

    #[test]
    fn failed_install_is_not_cached() {
        let sb = Sandbox::new(1);
        sb.write_manifest(r#"{"v":1}"#);

        sb.cmd()
            .args(["install", "npm"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("exit code: 1"))
            .stderr(predicate::str::contains("1 package manager(s) failed"));
        assert_eq!(archives(&sb.cache()), 0);
    }

    #[test]
    fn missing_tool_fails_without_side_effects() {
        let sb = Sandbox::new(0);
        fs::write(sb.project().join("bower.json"), "{}").unwrap();

        sb.cmd()
            .args(["install", "bower"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("bower is not installed"));
        assert!(!sb.cache().exists());
        assert!(!sb.project().join("bower_components").exists());
    }

    #[test]
    fn cache_list_and_clean() {
        let sb = Sandbox::new(0);
        sb.write_manifest(r#"{"v":1}"#);
        sb.cmd().args(["install", "npm"]).assert().success();

        sb.cmd()
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("10.0.0"))
            .stdout(predicate::str::contains("Total: 1 archive(s)"));

        sb.cmd()
            .args(["cache", "clean", "npm"])
            .assert()
            .success()
            .stdout(predicate::str::contains("pass --yes"));
        assert_eq!(archives(&sb.cache()), 1);

        sb.cmd()
            .args(["cache", "clean", "../project", "--yes"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown package manager: ../project"));
        assert!(sb.project().join("package.json").exists());

        sb.cmd()
            .args(["cache", "clean", "npm", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed"));
        assert_eq!(archives(&sb.cache()), 0);
    }
}
