mod common;

use common::transform;

#[test]
fn struct_type_literals() {
  let src = r#"package main

type Box[T] struct {
	val T
}

func main() {
	var _ = Box[int]{}
	var _ = Box[string]{}
}
"#;

  let expected = r#"package main

type (
	Box__int struct {
		val int
	}
	Box__string struct {
		val string
	}
)

func main() {
	var _ = Box__int{}
	var _ = Box__string{}
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn generic_functions() {
  let src = r#"package main

import "fmt"

func Print[T](t T) {
	fmt.Println(t)
}

func main() {
	Print[int](5)
	Print[int](42)
	Print[string]("x")
}
"#;

  let expected = r#"package main

import "fmt"

func Print__int(t int) {
	fmt.Println(t)
}

func Print__string(t string) {
	fmt.Println(t)
}

func main() {
	Print__int(5)
	Print__int(42)
	Print__string("x")
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn generic_methods_on_concrete_receivers() {
  let src = r#"package main

type A[T] T

func (a A[T]) f() T {
	var x T
	return x
}

func main() {
	var _ A[bool]
	var _ A[uint]
}
"#;

  let expected = r#"package main

type (
	A__bool bool
	A__uint uint
)

func (a A__bool) f() bool {
	var x bool
	return x
}

func (a A__uint) f() uint {
	var x uint
	return x
}

func main() {
	var _ A__bool
	var _ A__uint
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn inherited_type_parameters() {
  let src = r#"package main

type Tuple[T, U] struct {
	first T
	second U
}

type BoxedTuple[T, U] struct {
	val Tuple[T, U]
}

func main() {
	var _ = BoxedTuple[string, int]{}
}
"#;

  let expected = r#"package main

type Tuple__string__int struct {
	first string
	second int
}

type BoxedTuple__string__int struct {
	val Tuple__string__int
}

func main() {
	var _ = BoxedTuple__string__int{}
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn inherited_parameters_through_function_signatures() {
  let src = r#"package main

type Tuple[T, U] struct {
	first T
	second U
}

func NewTuple[T, U](first T, second U) Tuple[T, U] {
	return Tuple[T, U]{first: first, second: second}
}

func main() {
	var _ = NewTuple[bool, int64](true, 42)
}
"#;

  let expected = r#"package main

type Tuple__bool__int64 struct {
	first bool
	second int64
}

func NewTuple__bool__int64(first bool, second int64) Tuple__bool__int64 {
	return Tuple__bool__int64{first: first, second: second}
}

func main() {
	var _ = NewTuple__bool__int64(true, 42)
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn inherited_parameters_through_function_bodies() {
  let src = r#"package main

type A[T] T

func NewA[T]() {
	var _ A[T]
	F[T]()
}

func F[T]() T {
	var x T
	return x
}

func main() {
	NewA[string]()
}
"#;

  let expected = r#"package main

type A__string string

func NewA__string() {
	var _ A__string
	F__string()
}

func F__string() string {
	var x string
	return x
}

func main() {
	NewA__string()
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn mangle_collisions_are_disambiguated() {
  let src = r#"package main

type Box[T] struct {
	val T
}

func main() {
	var _ = Box[**string]{}
	var _ = Box[[]string]{}
	var _ = Box[****string]{}
	var _ = Box[[]**string]{}
	var _ = Box[**[]string]{}
	var _ = Box[[][]string]{}
}
"#;

  let expected = r#"package main

type (
	Box______string struct {
		val ****string
	}
	Box______string_0 struct {
		val **[]string
	}
	Box______string_1 struct {
		val []**string
	}
	Box______string_2 struct {
		val [][]string
	}
	Box____string struct {
		val **string
	}
	Box____string_0 struct {
		val []string
	}
)

func main() {
	var _ = Box____string{}
	var _ = Box____string_0{}
	var _ = Box______string{}
	var _ = Box______string_1{}
	var _ = Box______string_0{}
	var _ = Box______string_2{}
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn type_alias_collapses_to_one_instantiation() {
  let src = r#"package main

type Box[T] struct {
	val T
}

type S = string

func main() {
	var _ = Box[S]{}
	var _ = Box[string]{}
}
"#;

  let expected = r#"package main

type Box__string struct {
	val string
}

type S = string

func main() {
	var _ = Box__string{}
	var _ = Box__string{}
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn defined_type_stays_distinct_from_its_underlying() {
  let src = r#"package main

type Box[T] struct {
	val T
}

type S string

func main() {
	var _ = Box[S]{}
	var _ = Box[string]{}
}
"#;

  let expected = r#"package main

type (
	Box__S struct {
		val S
	}
	Box__string struct {
		val string
	}
)

type S string

func main() {
	var _ = Box__S{}
	var _ = Box__string{}
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn unused_generics_are_deleted() {
  let src = r#"package main

type T[U] struct {
}

func f[T](x T) {
}

func (T[U]) f0() {
}

func main() {
}
"#;

  let expected = r#"package main

func main() {}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn methods_with_their_own_type_parameters() {
  let src = r#"package main

func itoa(v int) string {
	return ""
}

type B[T] struct {
	v T
}

func (b B[T]) f0[V](f func(T) V) B[V] {
	return B[V]{v: f(b.v)}
}

func main() {
	y := B[int]{v: 42}
	var _ B[string] = y.f0[string](itoa)
}
"#;

  let expected = r#"package main

func itoa(v int) string {
	return ""
}

type (
	B__int struct {
		v int
	}
	B__string struct {
		v string
	}
)

func (b B__int) f0__string(f func(int) string) B__string {
	return B__string{v: f(b.v)}
}

func main() {
	y := B__int{v: 42}
	var _ B__string = y.f0__string(itoa)
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn methods_with_own_parameters_and_multiple_arguments() {
  let src = r#"package main

type A[T] T

func (a A[T]) f2[U, V]() (T, U, V) {
	var x U
	var y V
	return T(a), x, y
}

func main() {
	var x A[uint]
	var a uint
	var b float64
	var c int8
	a, b, c = x.f2[float64, int8]()
	print(a)
	print(b)
	print(c)
}
"#;

  let expected = r#"package main

type A__uint uint

func (a A__uint) f2__float64__int8() (uint, float64, int8) {
	var x float64
	var y int8
	return uint(a), x, y
}

func main() {
	var x A__uint
	var a uint
	var b float64
	var c int8
	a, b, c = x.f2__float64__int8()
	print(a)
	print(b)
	print(c)
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn selector_type_arguments() {
  let src = r#"package main

import "bytes"

type Box[T] struct {
	val T
}

func main() {
	var _ = Box[bytes.Buffer]{}
}
"#;

  let expected = r#"package main

import "bytes"

type Box__bytes_Buffer struct {
	val bytes.Buffer
}

func main() {
	var _ = Box__bytes_Buffer{}
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn recursive_generic_types() {
  let src = r#"package main

type A[T] struct {
	a *A[T]
	v T
}

func (a *A) init() {
	a.a = a
}

func main() {
	a := A[string]{v: "foo"}
	a.init()
	var _ string = a.a.a.v
}
"#;

  let expected = r#"package main

type A__string struct {
	a *A__string
	v string
}

func (a *A__string) init() {
	a.a = a
}

func main() {
	a := A__string{v: "foo"}
	a.init()
	var _ string = a.a.a.v
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn mutually_recursive_parameter_swap() {
  let src = r#"package main

type B[T, U] struct {
	b *B[U, T]
	t T
	u U
}

func main() {
	var _ = B[string, int]{t: "foo", u: 42}
}
"#;

  let expected = r#"package main

type (
	B__int__string struct {
		b *B__string__int
		t int
		u string
	}
	B__string__int struct {
		b *B__int__string
		t string
		u int
	}
)

func main() {
	var _ = B__string__int{t: "foo", u: 42}
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn recursive_generic_functions() {
  let src = r#"package main

func E[T]() T {
	return E[T]()
}

func G[T]() T {
	return H[T]()
}

func H[T]() T {
	return G[T]()
}

func main() {
	var _ uint8 = E[uint8]()
	var _ string = H[string]()
	var _ = G[[]int]()
}
"#;

  let expected = r#"package main

func E__uint8() uint8 {
	return E__uint8()
}

func G____int() []int {
	return H____int()
}

func G__string() string {
	return H__string()
}

func H____int() []int {
	return G____int()
}

func H__string() string {
	return G__string()
}

func main() {
	var _ uint8 = E__uint8()
	var _ string = H__string()
	var _ = G____int()
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn type_switches_and_assertions() {
  let src = r#"package main

type Box[T] struct {
	val T
}

func main() {
	var x interface{} = Box[int]{}
	switch x.(type) {
	case Box[int]:
	case Box[string]:
	}
	_ = x.(Box[int])
}
"#;

  let expected = r#"package main

type (
	Box__int struct {
		val int
	}
	Box__string struct {
		val string
	}
)

func main() {
	var x interface{} = Box__int{}
	switch x.(type) {
	case Box__int:
	case Box__string:
	}
	_ = x.(Box__int)
}
"#;

  assert_eq!(transform(src), expected);
}

#[test]
fn usages_in_make_and_containers() {
  let src = r#"package main

type List[T] []T

func NewList[T]() List[T] {
	return List[T]{}
}

func (l List[T]) Head() T {
	if len(l) > 0 {
		return l[0]
	}
	var x T
	return x
}

func main() {
	list := NewList[*int]()
	var _ *int = list.Head()
	var _ = NewList[map[string]bool]()
	var _ = NewList[chan int]()
}
"#;

  let expected = r#"package main

type (
	List___int []*int
	List__chan_int []chan int
	List__map_string_bool []map[string]bool
)

func NewList___int() List___int {
	return List___int{}
}

func NewList__chan_int() List__chan_int {
	return List__chan_int{}
}

func NewList__map_string_bool() List__map_string_bool {
	return List__map_string_bool{}
}

func (l List___int) Head() *int {
	if len(l) > 0 {
		return l[0]
	}
	var x *int
	return x
}

func (l List__chan_int) Head() chan int {
	if len(l) > 0 {
		return l[0]
	}
	var x chan int
	return x
}

func (l List__map_string_bool) Head() map[string]bool {
	if len(l) > 0 {
		return l[0]
	}
	var x map[string]bool
	return x
}

func main() {
	list := NewList___int()
	var _ *int = list.Head()
	var _ = NewList__map_string_bool()
	var _ = NewList__chan_int()
}
"#;

  assert_eq!(transform(src), expected);
}
