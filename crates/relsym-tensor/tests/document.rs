use relsym_tensor::{parse, symbols, BaseRelativityTensor, SymExpr, TensorDocument, TensorError};
use std::fs;
use tempfile::TempDir;

const SCHWARZSCHILD: &str = r#"
name = "schwarzschild"
config = "ll"
coords = ["t", "r", "theta", "phi"]
components = [
    ["1 - a/r", 0, 0, 0],
    [0, "-1/((1 - a/r)*c**2)", 0, 0],
    [0, 0, "-r**2/c**2", 0],
    [0, 0, 0, "-r**2*sin(theta)**2/c**2"],
]
"#;

#[test]
fn test_load_toml_file() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metric.toml");
    fs::write(&path, SCHWARZSCHILD).unwrap();

    let doc = TensorDocument::load_from_file(&path).unwrap();
    let t = doc.to_relativity_tensor().unwrap();
    assert_eq!(t.name(), Some("schwarzschild"));
    assert_eq!(t.order(), 2);
    assert_eq!(t.symbols().len(), 4);
    let vars: Vec<_> = t.variables().iter().map(|s| s.name()).collect();
    assert_eq!(vars, vec!["a", "c"]);
    assert_eq!(t[[3, 3]], parse("-r**2*sin(theta)**2/c**2").unwrap());
}

#[test]
fn test_unknown_extension_is_detected() {
    let dir = TempDir::new().unwrap();
    let toml_path = dir.path().join("metric.tensor");
    fs::write(&toml_path, SCHWARZSCHILD).unwrap();
    assert!(TensorDocument::load_from_file(&toml_path).is_ok());

    let json_path = dir.path().join("vector.tensor");
    fs::write(&json_path, r#"{"config": "u", "components": ["x", "y"]}"#).unwrap();
    let doc = TensorDocument::load_from_file(&json_path).unwrap();
    assert_eq!(doc.to_tensor().unwrap().config().to_string(), "u");

    let junk = dir.path().join("junk.tensor");
    fs::write(&junk, "not a tensor {").unwrap();
    assert!(matches!(
        TensorDocument::load_from_file(&junk),
        Err(TensorError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let original = TensorDocument::from_toml_str(SCHWARZSCHILD)
        .unwrap()
        .to_relativity_tensor()
        .unwrap();
    let doc = TensorDocument::from_relativity_tensor(&original).unwrap();

    for file in ["saved.json", "saved.toml"] {
        let path = dir.path().join(file);
        doc.save_to_file(&path).unwrap();
        let reloaded = TensorDocument::load_from_file(&path)
            .unwrap()
            .to_relativity_tensor()
            .unwrap();
        assert_eq!(reloaded.tensor(), original.tensor(), "{file}");
        assert_eq!(reloaded.variables(), original.variables());
        assert_eq!(reloaded.config(), original.config());
    }

    assert!(matches!(
        doc.save_to_file(&dir.path().join("saved.yaml")),
        Err(TensorError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_listed_variables_must_match() {
    let doc = TensorDocument::from_json_str(
        r#"{"coords": ["r"], "variables": ["k", "m"], "components": ["k*r"]}"#,
    )
    .unwrap();
    assert!(matches!(
        doc.to_relativity_tensor(),
        Err(TensorError::VariablesMismatch { .. })
    ));

    let doc = TensorDocument::from_json_str(
        r#"{"coords": ["r"], "variables": ["k"], "functions": ["f3"],
            "components": ["k*r + f3()"]}"#,
    )
    .unwrap();
    let t = doc.to_relativity_tensor().unwrap();
    assert_eq!(t.functions().len(), 1);
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        TensorDocument::load_from_file(&dir.path().join("absent.toml")),
        Err(TensorError::Io(_))
    ));
}

#[test]
fn test_undefined_functions_survive_reload() {
    let p = |s: &str| parse(s).unwrap();
    let mut g = vec![vec![SymExpr::int(0); 4]; 4];
    g[0][0] = p("1 - a*f1(a, x2)/x1");
    g[1][1] = p("-1/((1 - a/x1)*c**2)");
    g[2][2] = p("-x1**2/c**2");
    g[3][3] = p("-x1**2*sin(x2)**2/c**2");
    g[0][3] = p("5*f2(c)");
    g[3][0] = p("5*f2(c)");
    g[1][2] = SymExpr::undef("f3", vec![]);
    g[2][1] = SymExpr::undef("f3", vec![]);
    let original = BaseRelativityTensor::new(g, symbols("x0 x1 x2 x3"), "ll").unwrap();

    let doc = TensorDocument::from_relativity_tensor(&original).unwrap();
    assert_eq!(doc.components[1][2], "f3()");
    let dir = TempDir::new().unwrap();
    for file in ["arbitrary.json", "arbitrary.toml"] {
        let path = dir.path().join(file);
        doc.save_to_file(&path).unwrap();
        let reloaded = TensorDocument::load_from_file(&path)
            .unwrap()
            .to_relativity_tensor()
            .unwrap();
        assert_eq!(reloaded.tensor(), original.tensor(), "{file}");
        assert_eq!(reloaded.variables(), original.variables());
        assert_eq!(reloaded.functions(), original.functions());
        assert_eq!(reloaded.functions().len(), 3);
    }
}
