use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use geowire_core::builder::{from_text, to_hex};
use geowire_core::ByteOrder;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let mut args = env::args().skip(1);
    let Some(cmd) = args.next() else {
        print_usage();
        return Err("missing command".to_string());
    };

    match cmd.as_str() {
        "precommit" => {
            let mut full = false;
            for arg in args {
                match arg.as_str() {
                    "--full" => full = true,
                    "--ci" => {}
                    _ => return Err(format!("unknown precommit flag: {arg}")),
                }
            }
            precommit(full)
        }
        "check-corpus" => {
            let path = args
                .next()
                .ok_or_else(|| "check-corpus needs a file argument".to_string())?;
            check_corpus(Path::new(&path))
        }
        "install-hooks" => install_hooks(),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => {
            print_usage();
            Err(format!("unknown command: {cmd}"))
        }
    }
}

fn print_usage() {
    eprintln!("xtask commands:");
    eprintln!("  precommit [--full] [--ci]");
    eprintln!("  check-corpus <file>");
    eprintln!("  install-hooks");
}

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("xtask must live inside workspace")
        .to_path_buf()
}

fn precommit(full: bool) -> Result<(), String> {
    let root = repo_root();
    let mut steps: Vec<Vec<&str>> = vec![
        vec!["cargo", "fmt", "--all", "--", "--check"],
        vec![
            "cargo",
            "clippy",
            "-p",
            "geowire-core",
            "-p",
            "geowire-diesel",
            "--features",
            "sqlite",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
        vec!["cargo", "test", "--workspace"],
        vec![
            "cargo",
            "test",
            "-p",
            "geowire-diesel",
            "--features",
            "sqlite",
        ],
    ];

    if full {
        steps.extend([
            vec![
                "cargo",
                "clippy",
                "-p",
                "geowire-diesel",
                "--features",
                "postgres",
                "--",
                "-D",
                "warnings",
            ],
            vec!["cargo", "doc", "--workspace", "--no-deps"],
            vec![
                "cargo",
                "run",
                "--quiet",
                "-p",
                "xtask",
                "--",
                "check-corpus",
                "geowire-core/tests/data/corpus.wkt",
            ],
        ]);
    }

    for step in steps {
        run_step(&root, &step)?;
    }
    Ok(())
}

/// Decodes every non-blank, non-`#` line of `path` with the text facade and
/// checks that EWKT, NDR and XDR hex all decode back to the same value.
fn check_corpus(path: &Path) -> Result<(), String> {
    let text = fs::read_to_string(path).map_err(io_err)?;
    let mut failures = 0usize;
    let mut checked = 0usize;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        checked += 1;
        if let Err(e) = check_line(line) {
            failures += 1;
            eprintln!("{}:{}: {e}", path.display(), line_no + 1);
        }
    }

    eprintln!("checked {checked} geometries, {failures} failed");
    if failures == 0 {
        Ok(())
    } else {
        Err(format!("{failures} corpus entries did not round-trip"))
    }
}

fn check_line(line: &str) -> Result<(), String> {
    let (geom, encoding) = from_text(line).map_err(|e| e.to_string())?;
    if !geom.is_consistent() {
        return Err(format!("inconsistent {encoding:?} geometry"));
    }

    let mut encodings = vec![("EWKT", geom.to_ewkt())];
    for order in [ByteOrder::Ndr, ByteOrder::Xdr] {
        encodings.push(("hex EWKB", to_hex(&geom, order)));
    }
    for (name, encoded) in encodings {
        let (back, _) = from_text(&encoded).map_err(|e| format!("{name} re-read: {e}"))?;
        if back != geom {
            return Err(format!("{name} round-trip changed the geometry: {encoded}"));
        }
    }
    Ok(())
}

fn run_step(cwd: &Path, args: &[&str]) -> Result<(), String> {
    let (bin, rest) = args
        .split_first()
        .ok_or_else(|| "empty command step".to_string())?;
    eprintln!("+ {}", args.join(" "));

    let status = Command::new(bin)
        .args(rest)
        .current_dir(cwd)
        .status()
        .map_err(io_err)?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("command failed: {}", args.join(" ")))
    }
}

fn install_hooks() -> Result<(), String> {
    let root = repo_root();
    let hook_path = root.join(".git/hooks/pre-commit");
    let script = format!(
        "#!/usr/bin/env sh\nset -eu\ncd \"{}\"\ncargo run --quiet -p xtask -- precommit\n",
        root.display()
    );

    if let Some(parent) = hook_path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(&hook_path, script).map_err(io_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&hook_path).map_err(io_err)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&hook_path, perms).map_err(io_err)?;
    }

    println!("installed pre-commit hook at {}", hook_path.display());
    Ok(())
}

fn io_err(e: io::Error) -> String {
    e.to_string()
}
