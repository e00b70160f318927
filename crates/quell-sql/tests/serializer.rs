//! Serializer tests.
//!
//! Expression-level and query-level serialization against the generic
//! profile: aggregate rendering, LIKE escaping, tuple IN subqueries,
//! boolean composition, and binding order.

use once_cell::sync::Lazy;
use quell_core::{Expression, ExprType, Param, Value};
use quell_sql::{from, handle, serialize, table, SqlTemplates};

static GENERIC: Lazy<SqlTemplates> = Lazy::new(SqlTemplates::generic);

fn generic() -> &'static SqlTemplates {
    &GENERIC
}

#[test]
fn count_with_distinct_add() {
    let employee = table("EMPLOYEE", "EMPLOYEE");
    let id = employee.column("ID", ExprType::Int);
    let expr = id.count().add(id.count_distinct());

    let out = handle(&expr, generic()).unwrap();
    assert_eq!(out.sql, "count(EMPLOYEE.ID) + count(distinct EMPLOYEE.ID)");
    assert!(out.bindings.is_empty());
}

#[test]
fn some_over_not_null() {
    let employee = table("EMPLOYEE", "EMPLOYEE");
    let firstname = employee.column("FIRSTNAME", ExprType::Str);
    let expr = Expression::bool_any(firstname.is_not_null());

    let out = handle(&expr, generic()).unwrap();
    assert_eq!(out.sql, "some(EMPLOYEE.FIRSTNAME is not null)");
    assert!(out.bindings.is_empty());
}

#[test]
fn starts_with_escapes_and_binds() {
    let s1 = table("SURVEY", "s1");
    let name = s1.column("NAME", ExprType::Str);
    let expr = name.starts_with(Expression::string("X"));

    let out = handle(&expr, generic()).unwrap();
    assert_eq!(out.sql, "s1.NAME like ? escape '\\'");
    assert_eq!(out.constants(), vec![&Value::Str("X%".into())]);
}

#[test]
fn starts_with_escapes_user_wildcards() {
    let s1 = table("SURVEY", "s1");
    let name = s1.column("NAME", ExprType::Str);
    let expr = name.starts_with(Expression::string("10%_done\\"));

    let out = handle(&expr, generic()).unwrap();
    assert_eq!(
        out.constants(),
        vec![&Value::Str("10\\%\\_done\\\\%".into())]
    );
}

#[test]
fn ends_with_and_contains_patterns() {
    let s1 = table("SURVEY", "s1");
    let name = s1.column("NAME", ExprType::Str);

    let out = handle(&name.ends_with(Expression::string("X")), generic()).unwrap();
    assert_eq!(out.constants(), vec![&Value::Str("%X".into())]);

    let out = handle(&name.contains_str(Expression::string("X")), generic()).unwrap();
    assert_eq!(out.constants(), vec![&Value::Str("%X%".into())]);
}

#[test]
fn starts_with_ignore_case_lowers_both_sides() {
    let s1 = table("SURVEY", "s1");
    let name = s1.column("NAME", ExprType::Str);
    let expr = name.starts_with_ignore_case(Expression::string("Mixed"));

    let out = handle(&expr, generic()).unwrap();
    assert_eq!(out.sql, "lower(s1.NAME) like ? escape '\\'");
    assert_eq!(out.constants(), vec![&Value::Str("mixed%".into())]);
}

#[test]
fn tuple_in_subquery() {
    let survey = table("SURVEY", "SURVEY");
    let id = survey.column("ID", ExprType::Int);
    let name = survey.column("NAME", ExprType::Str);

    let sub = from(survey.clone())
        .select([id.clone(), name.clone()])
        .build()
        .unwrap();
    let expr = Expression::tuple(vec![id, name]).in_query(sub);

    let out = handle(&expr, generic()).unwrap();
    assert_eq!(
        out.sql,
        "(SURVEY.ID, SURVEY.NAME) in (select SURVEY.ID, SURVEY.NAME\nfrom SURVEY SURVEY)"
    );
}

#[test]
fn boolean_composition_parenthesizes_by_precedence() {
    let s = table("SURVEY", "s");
    let name = s.column("NAME", ExprType::Str);

    let left = name.eq(name.clone());
    let right = name.eq(name.clone()).or(name.eq(name.clone()));
    let out = handle(&left.and(right), generic()).unwrap();
    assert_eq!(
        out.sql,
        "s.NAME = s.NAME and (s.NAME = s.NAME or s.NAME = s.NAME)"
    );
}

#[test]
fn or_inside_or_needs_no_parentheses() {
    let s = table("SURVEY", "s");
    let name = s.column("NAME", ExprType::Str);
    let eq = name.eq(name.clone());
    let out = handle(&eq.or(eq.clone()).or(eq.clone()), generic()).unwrap();
    assert_eq!(
        out.sql,
        "s.NAME = s.NAME or s.NAME = s.NAME or s.NAME = s.NAME"
    );
}

#[test]
fn negation_parenthesizes_looser_arithmetic() {
    let t = table("T", "t");
    let a = t.column("A", ExprType::Int);
    let out = handle(&a.add(Expression::number(1)).negate(), generic()).unwrap();
    assert_eq!(out.sql, "-(t.A + ?)");
}

#[test]
fn bindings_follow_placeholder_order() {
    let survey = table("SURVEY", "SURVEY");
    let id = survey.column("ID", ExprType::Int);
    let name = survey.column("NAME", ExprType::Str);

    let sub = from(survey.clone())
        .where_(name.eq(Expression::string("inner")))
        .select([id.clone()])
        .build()
        .unwrap();
    let predicate = id
        .gt(Expression::number(7))
        .and(id.in_query(sub))
        .and(name.ne(Expression::string("outer")));

    let out = handle(&predicate, generic()).unwrap();
    let placeholders = out.sql.matches('?').count();
    assert_eq!(placeholders, out.bindings.len());
    assert_eq!(
        out.constants(),
        vec![
            &Value::Int(7),
            &Value::Str("inner".into()),
            &Value::Str("outer".into()),
        ]
    );
}

#[test]
fn equal_trees_serialize_identically() {
    let survey = table("SURVEY", "SURVEY");
    let name = survey.column("NAME", ExprType::Str);
    let a = name.starts_with(Expression::string("X")).and(name.is_not_null());
    let b = name.starts_with(Expression::string("X")).and(name.is_not_null());
    assert_eq!(a, b);

    let templates = generic();
    let out_a = handle(&a, templates).unwrap();
    let out_b = handle(&b, templates).unwrap();
    assert_eq!(out_a.sql, out_b.sql);
    assert_eq!(out_a.bindings, out_b.bindings);
}

#[test]
fn in_list_expands_to_placeholder_list() {
    let survey = table("SURVEY", "SURVEY");
    let id = survey.column("ID", ExprType::Int);
    let expr = id.in_list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);

    let out = handle(&expr, generic()).unwrap();
    assert_eq!(out.sql, "SURVEY.ID in (?, ?, ?)");
    assert_eq!(
        out.constants(),
        vec![&Value::Int(1), &Value::Int(2), &Value::Int(3)]
    );
}

#[test]
fn param_markers_are_recorded_and_resolved() {
    let survey = table("SURVEY", "SURVEY");
    let name = survey.column("NAME", ExprType::Str);
    let marker = Param::new("target", ExprType::Str);
    let expr = name.eq(Expression::Param(marker.clone()));

    let out = handle(&expr, generic()).unwrap();
    assert_eq!(out.sql, "SURVEY.NAME = ?");
    assert!(out.constants().is_empty(), "markers are not constants");

    let bound = out
        .bind(&[(marker, Value::Str("resolved".into()))])
        .unwrap();
    assert_eq!(bound, vec![Value::Str("resolved".into())]);

    let unbound = out.bind(&[]);
    assert!(unbound.is_err(), "unresolved marker must not bind");
}

#[test]
fn nested_aggregates_are_rejected() {
    let employee = table("EMPLOYEE", "EMPLOYEE");
    let id = employee.column("ID", ExprType::Int);
    let nested = id.count().sum();

    let err = handle(&nested, generic()).unwrap_err();
    assert!(
        matches!(err, quell_core::Error::MalformedQuery(_)),
        "expected MalformedQuery, got {err:?}"
    );
}

#[test]
fn exists_frames_the_subquery() {
    let survey = table("SURVEY", "SURVEY");
    let id = survey.column("ID", ExprType::Int);
    let sub = from(survey.clone()).select([id]).build().unwrap();

    let out = handle(&Expression::exists(sub), generic()).unwrap();
    assert_eq!(out.sql, "exists (select SURVEY.ID\nfrom SURVEY SURVEY)");
}

#[test]
fn serialize_requires_a_projection() {
    let survey = table("SURVEY", "SURVEY");
    let md = from(survey).build().unwrap();
    let err = serialize(&md, generic()).unwrap_err();
    assert!(matches!(err, quell_core::Error::MalformedQuery(_)));
}

#[test]
fn serialize_full_select() {
    let survey = table("SURVEY", "SURVEY");
    let id = survey.column("ID", ExprType::Int);
    let name = survey.column("NAME", ExprType::Str);

    let md = from(survey.clone())
        .where_(name.is_not_null())
        .group_by([name.clone()])
        .having(id.count().gt(Expression::number(1)))
        .order_by([name.asc()])
        .limit(10)
        .offset(20)
        .select([name.clone(), id.count()])
        .build()
        .unwrap();

    let out = serialize(&md, generic()).unwrap();
    assert_eq!(
        out.sql,
        "select SURVEY.NAME, count(SURVEY.ID)\n\
         from SURVEY SURVEY\n\
         where SURVEY.NAME is not null\n\
         group by SURVEY.NAME\n\
         having count(SURVEY.ID) > ?\n\
         order by SURVEY.NAME asc\n\
         limit 10\n\
         offset 20"
    );
    assert_eq!(out.constants(), vec![&Value::Int(1)]);
}
