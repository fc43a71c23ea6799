// Build contract tests: file and directory inputs, output files, and the
// exit status of each command-line driver.

use hackforge::assembler::encoder::parse_words;
use hackforge::simulator::Cpu;
use hackforge::{Assembler, ToolchainError, TranslatorConfig, VmTranslator};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

const SYS_VM: &str = "\
function Sys.init 0
push constant 5
call Main.double 1
label END
goto END
";

const MAIN_VM: &str = "\
// doubles its argument
function Main.double 0
push argument 0
push argument 0
add
return
";

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hackforge_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_directory_build_runs() {
    let dir = scratch_dir("directory_build");
    let src = dir.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("Sys.vm"), SYS_VM).unwrap();
    fs::write(src.join("Main.vm"), MAIN_VM).unwrap();
    fs::write(src.join("notes.txt"), "not a source file\n").unwrap();

    let asm_path = dir.join("Prog.asm");
    let hack_path = dir.join("Prog.hack");

    let units = VmTranslator::default().translate_path(&src, &asm_path).unwrap();
    assert_eq!(units, 2);

    let text = fs::read_to_string(&asm_path).unwrap();
    // Units are emitted in sorted file-name order after a single bootstrap
    let main_at = text.find("(Main.double)").unwrap();
    let sys_at = text.find("(Sys.init)").unwrap();
    assert!(main_at < sys_at);
    assert_eq!(text.matches("// bootstrap").count(), 1);
    assert!(text.starts_with("// bootstrap\n@256\n"));

    let program = Assembler::new().assemble_file(&asm_path, &hack_path).unwrap();
    let words = parse_words(&fs::read_to_string(&hack_path).unwrap()).unwrap();
    assert_eq!(words, program.words);

    let halt = program.symbol_address("Sys.init$END").unwrap();
    let mut cpu = Cpu::new(words);
    cpu.run_until_pc(halt, 100_000).unwrap();
    assert_eq!(cpu.ram[261], 10);
    assert_eq!(cpu.ram[0], 262);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_single_file_build() {
    let dir = scratch_dir("single_file");
    let input = dir.join("Simple.vm");
    fs::write(&input, "push constant 2\npush constant 3\nadd\n").unwrap();
    let output = dir.join("Simple.asm");

    let translator = VmTranslator::new(TranslatorConfig {
        bootstrap: false,
        emit_comments: false,
        ..TranslatorConfig::default()
    });
    assert_eq!(translator.translate_path(&input, &output).unwrap(), 1);

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("@2\nD=A\n"));
    assert!(text.ends_with("M=D+M\n"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_failed_build_writes_nothing() {
    let dir = scratch_dir("failed_build");
    let input = dir.join("Bad.vm");
    fs::write(&input, "push constant 1\npop constant 0\n").unwrap();
    let output = dir.join("Bad.asm");

    let err = VmTranslator::default()
        .translate_path(&input, &output)
        .unwrap_err();
    assert_eq!(err.line(), Some(2));
    assert!(!output.exists());

    let missing = VmTranslator::default()
        .translate_path(&dir.join("Nope.vm"), &output)
        .unwrap_err();
    assert!(matches!(missing, ToolchainError::IOError(_)));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_assembler_binary_contract() {
    let dir = scratch_dir("assembler_binary");
    let input = dir.join("Add.asm");
    let output = dir.join("Add.hack");
    fs::write(&input, "// adds 2 and 3\n@2\nD=A\n@3\nD=D+A\n@0\nM=D\n").unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_hack-assembler"))
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());
    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text.lines().count(), 6);
    assert!(text.ends_with("1110001100001000\n"));

    let bad = dir.join("Bad.asm");
    let bad_out = dir.join("Bad.hack");
    fs::write(&bad, "@1\nD=D*A\n").unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_hack-assembler"))
        .arg(&bad)
        .arg(&bad_out)
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(3));
    assert!(!bad_out.exists());

    let unterminated = dir.join("Label.asm");
    fs::write(&unterminated, "(LOOP\n@LOOP\n").unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_hack-assembler"))
        .arg(&unterminated)
        .arg(dir.join("Label.hack"))
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(2));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_translator_binary_contract() {
    let dir = scratch_dir("translator_binary");
    let src = dir.join("prog");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("Sys.vm"), SYS_VM).unwrap();
    fs::write(src.join("Main.vm"), MAIN_VM).unwrap();
    let output = dir.join("prog.asm");

    let status = Command::new(env!("CARGO_BIN_EXE_vm-translator"))
        .arg(&src)
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(fs::read_to_string(&output).unwrap().contains("(Main.double)"));

    let config = dir.join("build.toml");
    fs::write(&config, "[translator]\nentry_function = \"Main.double\"\n").unwrap();
    let configured = dir.join("configured.asm");
    let status = Command::new(env!("CARGO_BIN_EXE_vm-translator"))
        .arg("--config")
        .arg(&config)
        .arg("--no-bootstrap")
        .arg(&src)
        .arg(&configured)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(!fs::read_to_string(&configured).unwrap().contains("bootstrap"));

    let bad = dir.join("Bad.vm");
    fs::write(&bad, "push constant 1\njump LOOP\n").unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_vm-translator"))
        .arg(&bad)
        .arg(dir.join("Bad.asm"))
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(2));

    fs::write(&bad, "push local\n").unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_vm-translator"))
        .arg(&bad)
        .arg(dir.join("Bad.asm"))
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(4));

    fs::write(&config, "[translator]\nstack_base = \"high\"\n").unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_vm-translator"))
        .arg("--config")
        .arg(&config)
        .arg(&src)
        .arg(dir.join("never.asm"))
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(8));
    assert!(!dir.join("never.asm").exists());

    let _ = fs::remove_dir_all(&dir);
}
