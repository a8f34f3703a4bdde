use assert_cmd::Command;
use predicates::prelude::*;

fn fo() -> Command {
  Command::cargo_bin("fo").expect("binary builds")
}

#[test]
fn build_writes_a_sibling_go_file() {
  let dir = tempfile::tempdir().unwrap();
  let source = dir.path().join("box.fo");
  std::fs::write(
    &source,
    r#"package main

type Box[T] struct {
	val T
}

func main() {
	var _ = Box[int]{}
}
"#,
  )
  .unwrap();

  fo().arg("build").arg(source.to_str().unwrap()).assert().success();

  let output = std::fs::read_to_string(dir.path().join("box.go")).unwrap();
  assert!(output.contains("type Box__int struct"));
  assert!(output.contains("var _ = Box__int{}"));
  assert!(!output.contains("Box[int]"));
}

#[test]
fn build_walks_directories() {
  let dir = tempfile::tempdir().unwrap();
  let nested = dir.path().join("sub");
  std::fs::create_dir(&nested).unwrap();
  std::fs::write(dir.path().join("a.fo"), "package main\n\nfunc main() {\n}\n").unwrap();
  std::fs::write(nested.join("b.fo"), "package sub\n\nfunc helper() {\n}\n").unwrap();

  fo().arg("build").arg(dir.path().to_str().unwrap()).assert().success();

  assert!(dir.path().join("a.go").exists());
  assert!(nested.join("b.go").exists());
}

#[test]
fn diagnostics_produce_nonzero_exit() {
  let dir = tempfile::tempdir().unwrap();
  let source = dir.path().join("bad.fo");
  std::fs::write(
    &source,
    r#"package main

func main() {
	var _ = missing
}
"#,
  )
  .unwrap();

  fo()
    .arg("build")
    .arg(source.to_str().unwrap())
    .assert()
    .failure()
    .stderr(predicate::str::contains("undeclared name: missing"));
}

#[test]
fn non_fo_files_are_rejected() {
  let dir = tempfile::tempdir().unwrap();
  let source = dir.path().join("main.go");
  std::fs::write(&source, "package main\n").unwrap();

  fo()
    .arg("build")
    .arg(source.to_str().unwrap())
    .assert()
    .failure()
    .stderr(predicate::str::contains("expected '.fo' extension"));
}

#[test]
fn dump_output_prints_the_transformed_source() {
  let dir = tempfile::tempdir().unwrap();
  let source = dir.path().join("box.fo");
  std::fs::write(
    &source,
    r#"package main

type Box[T] struct {
	val T
}

func main() {
	var _ = Box[string]{}
}
"#,
  )
  .unwrap();

  fo()
    .arg("build")
    .arg(source.to_str().unwrap())
    .arg("--dump")
    .arg("output")
    .assert()
    .success()
    .stdout(predicate::str::contains("type Box__string struct"));
}
