use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::Path;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

fn compress_expand_test(base_name: &str,extra: &[&str]) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = Path::new("tests").join([base_name,".txt"].concat());
    let cmp_path = temp_dir.path().join([base_name,".shf"].concat());
    let out_path = temp_dir.path().join([base_name,".txt"].concat());
    Command::cargo_bin("statichuff")?
        .arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .args(extra)
        .assert()
        .success()
        .stderr(predicate::str::contains("size reduced"));
    Command::cargo_bin("statichuff")?
        .arg("expand")
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .args(extra)
        .assert()
        .success();
    match (std::fs::read(in_path),std::fs::read(cmp_path),std::fs::read(out_path)) {
        (Ok(v1),Ok(c),Ok(v2)) => {
            assert!(c.len() > 0);
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with reference")
    }
    Ok(())
}

#[test]
fn invertibility() -> STDRESULT {
    compress_expand_test("sample",&[])
}

#[test]
fn invertibility_bare() -> STDRESULT {
    compress_expand_test("sample",&["--bare"])
}

#[test]
fn compression_works() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("small.txt");
    let out_path = temp_dir.path().join("small.shf");
    std::fs::write(&in_path,"aaabbc")?;
    Command::cargo_bin("statichuff")?
        .arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    let expected = hex::decode("53484631 0300 6103000000 6202000000 6301000000 0900000000000000 01D4".replace(" ",""))?;
    assert_eq!(std::fs::read(out_path)?,expected);
    Ok(())
}

#[test]
fn empty_input_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("empty.txt");
    let out_path = temp_dir.path().join("empty.shf");
    std::fs::write(&in_path,"")?;
    Command::cargo_bin("statichuff")?
        .arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("EmptyInput"));
    Ok(())
}

#[test]
fn foreign_file_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let out_path = temp_dir.path().join("sample.out");
    Command::cargo_bin("statichuff")?
        .arg("expand")
        .arg("-i").arg(Path::new("tests").join("sample.txt"))
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("FileFormatMismatch"));
    Ok(())
}
