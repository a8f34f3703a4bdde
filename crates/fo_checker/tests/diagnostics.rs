mod common;

use insta::assert_snapshot;

#[test]
fn wrong_number_of_type_arguments() {
  let result = common::check(
    r#"package main

type Tuple[T, U] struct {
	first T
	second U
}

func main() {
	var _ = Tuple[int]{}
}
"#,
  );

  assert_snapshot!(common::format_diagnostics(&result), @r#"
  C0005: wrong number of type arguments (expected 2 but got 1) @9
  "#);
}

#[test]
fn type_arguments_for_non_generic() {
  let result = common::check(
    r#"package main

type Plain struct {
	x int
}

func main() {
	var _ = Plain[int]{}
}
"#,
  );

  assert_snapshot!(common::format_diagnostics(&result), @r#"
  C0004: type arguments provided for non-generic type Plain @8
  "#);
}

#[test]
fn missing_type_arguments() {
  let result = common::check(
    r#"package main

type Box[T] struct {
	val T
}

var x Box
"#,
  );

  assert_snapshot!(common::format_diagnostics(&result), @r#"
  C0006: missing type arguments for generic type Box @7
  "#);
}

#[test]
fn duplicate_type_parameter_names() {
  common::assert_codes(
    r#"package main

type Pair[T, T] struct {
	first T
}

func main() {
	var _ = Pair[int, int]{}
}
"#,
    &["C0007"],
  );
}

#[test]
fn cyclic_declarations() {
  common::assert_codes(
    r#"package main

type A B

type B A

func main() {
}
"#,
    &["C0008"],
  );
}

#[test]
fn pointer_guarded_recursion_is_not_a_cycle() {
  common::assert_ok(
    r#"package main

type List struct {
	next *List
	value int
}

func main() {
}
"#,
  );
}

#[test]
fn undeclared_names_are_reported() {
  common::assert_codes(
    r#"package main

func main() {
	var a int = x
	var b int = y
	_ = a
	_ = b
}
"#,
    &["C0001"],
  );
}

#[test]
fn receiver_params_must_be_type_parameters() {
  common::assert_codes(
    r#"package main

type A[T] T

func (a A[string]) f() {
}

func main() {
}
"#,
    &["C0011"],
  );
}

#[test]
fn unknown_receiver_type() {
  common::assert_codes(
    r#"package main

func (a Missing) f() {
}

func main() {
}
"#,
    &["C0009"],
  );
}

#[test]
fn checking_continues_after_errors() {
  let result = common::check(
    r#"package main

type Box[T] struct {
	val T
}

func main() {
	var _ = Box[int, string]{}
	var _ = Box[bool]{}
}
"#,
  );

  // the arity error is reported, and the valid usage is still recorded
  let codes: Vec<String> = result.output.diagnostics.iter().map(|d| d.code()).collect();
  assert!(codes.contains(&"C0005".to_string()));
  let decl = result.output.registry.lookup("Box").unwrap();
  assert!(decl.usages.contains_key("bool"));
}

#[test]
fn generic_registry_tracks_method_keys() {
  let result = common::check(
    r#"package main

type A[T] T

func (a A[T]) f2[U, V]() (T, U, V) {
	var x U
	var y V
	return T(a), x, y
}

func main() {
	var x A[uint]
	a, b, c := x.f2[float64, int8]()
	_ = a
	_ = b
	_ = c
}
"#,
  );

  assert!(result.output.diagnostics.is_empty(), "unexpected diagnostics");
  let decl = result.output.registry.lookup("A.f2").unwrap();
  assert_eq!(decl.type_params, vec!["T".to_string(), "U".to_string(), "V".to_string()]);
  assert!(decl.usages.contains_key("uint,float64,int8"));
}

#[test]
fn partial_instantiations_are_not_recorded() {
  let result = common::check(
    r#"package main

type Tuple[T, U] struct {
	first T
	second U
}

type BoxedTuple[T, U] struct {
	val Tuple[T, U]
}

func main() {
}
"#,
  );

  // the nested Tuple[T, U] stays partial: no usage may be recorded
  let decl = result.output.registry.lookup("Tuple").unwrap();
  assert!(decl.usages.is_empty());
}
