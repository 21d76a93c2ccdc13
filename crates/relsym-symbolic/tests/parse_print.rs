use relsym_symbolic::{parse, symbols, SymExpr, SymbolicError};

#[test]
fn test_parse_matches_operator_construction() {
    let syms = symbols("a r c");
    let (a, r, c) = (
        SymExpr::from(&syms[0]),
        SymExpr::from(&syms[1]),
        SymExpr::from(&syms[2]),
    );
    let built = SymExpr::int(-1) / ((SymExpr::int(1) - &a / &r) * c.powi(2));
    assert_eq!(parse("-1/((1 - a/r)*c^2)").unwrap(), built);
    assert_eq!(parse("-1/((1 - a/r)*c**2)").unwrap(), built);
}

#[test]
fn test_print_round_trips_through_parse() {
    for input in [
        "-a/r + 1",
        "x**2",
        "sin(theta)**2",
        "f1(a, x2)",
        "2*x/(3*y**2)",
        "sqrt(x + 1)",
        "x - y",
        "f3()",
        "f3() + f3",
        "0/0",
    ] {
        let e = parse(input).unwrap();
        let printed = e.to_string();
        assert_eq!(parse(&printed).unwrap(), e, "{input} printed as {printed}");
    }
}

#[test]
fn test_printed_forms() {
    assert_eq!(parse("1 - a/r").unwrap().to_string(), "-a/r + 1");
    assert_eq!(parse("r**2*sin(theta)**2").unwrap().to_string(), "r**2*sin(theta)**2");
    assert_eq!(parse("f3()").unwrap().to_string(), "f3()");
    assert_eq!(parse("f3").unwrap().to_string(), "f3");
    assert_eq!(parse("0/0").unwrap().to_string(), "0/0");
    assert_eq!(parse("1/0").unwrap().to_string(), "1/0");
    assert_eq!(parse("0*x").unwrap().to_string(), "0");
    assert_eq!(parse("x**(1/2)").unwrap().to_string(), "sqrt(x)");
}

#[test]
fn test_parse_errors_report_position() {
    let err = parse("1 + * 2").unwrap_err();
    assert_eq!(
        err,
        SymbolicError::Parse {
            position: 4,
            message: "unexpected token '*'".to_string()
        }
    );
    assert!(err.to_string().contains("offset 4"));
}
