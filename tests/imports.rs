use std::fs;
use std::path::{Path, PathBuf};

use gatesim_core::{load_circuit, Signal, Simulator};
use tempfile::TempDir;

const HALF_ADDER: &str = "
// inputs
dev A = SWITCH { InitialValue: 0; }
dev B = SWITCH { InitialValue: 0; }

dev S = XOR { I1: A; I2: B; }
dev C = AND { I1: A; I2: B; }
monitor S, C, A as IN_A;
";

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write circuit file");
    path
}

fn load_errors(path: &Path) -> Vec<String> {
    match load_circuit(path) {
        Ok(_) => Vec::new(),
        Err(diagnostics) => diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.message.clone())
            .collect(),
    }
}

#[test]
fn test_import_adds_devices_to_the_same_network() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(
        temp_dir.path(),
        "inputs.circuit",
        "dev SW1 = SWITCH { InitialValue: 1; }
         dev SW2 = SWITCH { InitialValue: 0; }",
    );
    let main = write_file(
        temp_dir.path(),
        "main.circuit",
        "import \"inputs.circuit\";
         dev G = OR { I1: SW1; I2: SW2; }
         monitor G;",
    );

    let loaded = load_circuit(&main).expect("circuit should load");
    assert_eq!(loaded.circuit.network.len(), 3);

    let mut sim = Simulator::new(loaded.circuit);
    sim.run_cycles(2).unwrap();
    assert_eq!(sim.trace_of(0).unwrap(), vec![Signal::High, Signal::High]);
}

#[test]
fn test_imported_file_sees_earlier_devices() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "inverter.circuit", "dev INV = NAND { I1: SW; }");
    let main = write_file(
        temp_dir.path(),
        "main.circuit",
        "dev SW = SWITCH { InitialValue: 1; }
         import \"inverter.circuit\";
         monitor INV;",
    );

    let loaded = load_circuit(&main).expect("circuit should load");
    let mut sim = Simulator::new(loaded.circuit);
    sim.run_cycles(1).unwrap();
    assert_eq!(sim.signal_of("INV").unwrap(), Signal::Low);
}

#[test]
fn test_import_cycle_is_reported() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(
        temp_dir.path(),
        "a.circuit",
        "import \"b.circuit\";
         dev SW = SWITCH { InitialValue: 1; }",
    );
    write_file(temp_dir.path(), "b.circuit", "import \"a.circuit\";");
    let errors = load_errors(&temp_dir.path().join("a.circuit"));
    assert_eq!(errors, vec!["file 'a.circuit' is already included"]);
}

#[test]
fn test_missing_import_is_reported() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let main = write_file(
        temp_dir.path(),
        "main.circuit",
        "import \"nowhere.circuit\";
         dev SW = SWITCH { InitialValue: 1; }",
    );
    let errors = load_errors(&main);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("cannot open 'nowhere.circuit'"));
}

#[test]
fn test_subcircuit_device() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "half_adder.circuit", HALF_ADDER);
    let main = write_file(
        temp_dir.path(),
        "main.circuit",
        "dev X = SWITCH { InitialValue: 1; }
         dev Y = SWITCH { InitialValue: 1; }
         dev HA = \"half_adder.circuit\" { A: X; B: Y; }
         monitor HA.S as SUM, HA.C as CARRY;",
    );

    let loaded = load_circuit(&main).expect("circuit should load");
    assert!(loaded.diagnostics.is_empty());

    let mut sim = Simulator::new(loaded.circuit);
    sim.run_cycles(1).unwrap();
    assert_eq!(sim.signal_of("HA.S").unwrap(), Signal::Low);
    assert_eq!(sim.signal_of("HA.C").unwrap(), Signal::High);

    sim.set_switch("Y", false).unwrap();
    sim.run_cycles(1).unwrap();
    assert_eq!(sim.trace_of(0).unwrap(), vec![Signal::Low, Signal::High]);
    assert_eq!(sim.trace_of(1).unwrap(), vec![Signal::High, Signal::Low]);
    assert_eq!(sim.display_name(0).as_deref(), Some("SUM"));
}

#[test]
fn test_subcircuit_pins_are_checked() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(temp_dir.path(), "half_adder.circuit", HALF_ADDER);
    let main = write_file(
        temp_dir.path(),
        "main.circuit",
        "dev X = SWITCH { InitialValue: 1; }
         dev HA = \"half_adder.circuit\" { A: X; }
         monitor HA.CC, HA.IN_A;",
    );
    let errors = load_errors(&main);
    assert_eq!(
        errors,
        vec![
            "imported device 'HA' has no output 'CC' (did you mean 'C'?)",
            "imported device 'HA' has no output 'IN_A'",
            "input 'HA.B' is not connected",
        ]
    );
}

#[test]
fn test_subcircuit_with_errors_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(
        temp_dir.path(),
        "broken.circuit",
        "dev A = SWITCH;
         monitor A;",
    );
    let main = write_file(temp_dir.path(), "main.circuit", "dev B = \"broken.circuit\";");
    let errors = load_errors(&main);
    assert_eq!(
        errors,
        vec![
            "switch 'A' has no InitialValue",
            "'broken.circuit' has errors and cannot be used as a device",
        ]
    );
}

#[test]
fn test_subcircuit_cannot_contain_itself() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let main = write_file(
        temp_dir.path(),
        "main.circuit",
        "dev SW = SWITCH { InitialValue: 1; }
         dev SELF = \"main.circuit\";
         monitor SW;",
    );
    let errors = load_errors(&main);
    assert_eq!(errors, vec!["file 'main.circuit' is already included"]);
}

#[test]
fn test_subcircuit_exports_named_pins() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(
        temp_dir.path(),
        "latch.circuit",
        "dev D = SWITCH { InitialValue: 0; }
         dev CLK = CLOCK { Period: 1; }
         dev ZERO = SWITCH { InitialValue: 0; }
         dev FF = DTYPE { DATA: D; CLK: CLK; SET: ZERO; CLEAR: ZERO; }
         dev N = NAND { I1: FF.Q; }
         monitor FF.Q, N as OUT;",
    );
    let main = write_file(
        temp_dir.path(),
        "main.circuit",
        "dev ONE = SWITCH { InitialValue: 1; }
         dev LOW = SWITCH { InitialValue: 0; }
         dev L = \"latch.circuit\" { D: ONE; ZERO: LOW; }
         monitor L.Q;",
    );

    let loaded = load_circuit(&main).expect("circuit should load");
    assert!(loaded.diagnostics.is_empty());
    let mut sim = Simulator::new(loaded.circuit);
    sim.run_cycles(3).unwrap();
    assert_eq!(sim.signal_of("L.Q").unwrap(), Signal::High);

    let aliased = write_file(
        temp_dir.path(),
        "aliased.circuit",
        "dev ONE = SWITCH { InitialValue: 1; }
         dev L = \"latch.circuit\" { D: ONE; ZERO: ONE; }
         monitor L.OUT;",
    );
    assert_eq!(load_errors(&aliased), vec!["imported device 'L' has no output 'OUT'"]);
}

#[test]
fn test_subcircuit_output_name_clash_is_a_warning() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(
        temp_dir.path(),
        "pair.circuit",
        "dev D = SWITCH { InitialValue: 1; }
         dev FF1 = DTYPE { DATA: D; CLK: D; SET: D; CLEAR: D; }
         dev FF2 = DTYPE { DATA: D; CLK: D; SET: D; CLEAR: D; }
         monitor FF1.Q, FF2.Q;",
    );
    let main = write_file(
        temp_dir.path(),
        "main.circuit",
        "dev ONE = SWITCH { InitialValue: 1; }
         dev P = \"pair.circuit\" { D: ONE; }
         monitor P.Q;",
    );

    let loaded = load_circuit(&main).expect("circuit should load");
    let warnings: Vec<&str> = loaded
        .diagnostics
        .iter()
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("monitor 'FF2.Q' in '"));
    assert!(warnings[0].ends_with("is not exported: output 'Q' is already used by 'FF1.Q'"));
}

#[test]
fn test_subcircuit_without_outputs_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(
        temp_dir.path(),
        "quiet.circuit",
        "dev A = SWITCH { InitialValue: 0; }
         monitor A as X;",
    );
    let main = write_file(temp_dir.path(), "main.circuit", "dev Q = \"quiet.circuit\";");
    let errors = load_errors(&main);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].ends_with("has no unaliased monitors, so it has no outputs to use as a device"));
}
