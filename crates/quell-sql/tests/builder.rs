//! Query builder tests.
//!
//! Structural validation surfaced through the fluent chain, the WITH
//! prelude, set operations, and param binding through metadata.

use quell_core::{Error, Expression, ExprType, FlagPosition, Param, Value};
use quell_sql::{from, serialize, table, union, union_all, DialectType, SqlTemplates};

#[test]
fn join_already_declared() {
    let survey = table("SURVEY", "SURVEY");
    let err = from(survey.clone()).full_join(survey).build().unwrap_err();
    assert!(
        matches!(err, Error::MalformedQuery(_)),
        "expected MalformedQuery, got {err:?}"
    );
}

#[test]
fn first_error_wins_and_sticks() {
    let survey = table("SURVEY", "SURVEY");
    let name = survey.column("NAME", ExprType::Str);
    let builder = from(survey.clone())
        .full_join(survey.clone())
        .where_(name.is_not_null())
        .limit(0);

    let err = builder.build().unwrap_err();
    let message = err.to_string();
    assert!(
        message.contains("join target"),
        "first recorded error must win: {message}"
    );
}

#[test]
fn distinct_tables_can_be_joined() {
    let survey = table("SURVEY", "SURVEY");
    let s2 = table("SURVEY", "s2");
    let md = from(survey.clone())
        .full_join(s2.clone())
        .on(survey
            .column("ID", ExprType::Int)
            .eq(s2.column("ID", ExprType::Int)))
        .build();
    assert!(md.is_ok(), "different variables are different targets");
}

#[test]
fn on_without_join_is_rejected() {
    let survey = table("SURVEY", "SURVEY");
    let cond = survey
        .column("ID", ExprType::Int)
        .eq(Expression::number(1));
    let err = quell_sql::QueryBuilder::new().on(cond).build().unwrap_err();
    assert!(matches!(err, Error::MalformedQuery(_)));
}

#[test]
fn join_condition_renders_on_clause() {
    let survey = table("SURVEY", "SURVEY");
    let employee = table("EMPLOYEE", "EMPLOYEE");
    let survey_id = survey.column("ID", ExprType::Int);
    let employee_id = employee.column("SURVEY_ID", ExprType::Int);

    let sql = from(survey.clone())
        .inner_join(employee.clone())
        .on(survey_id.eq(employee_id))
        .to_sql(&SqlTemplates::generic())
        .unwrap();
    assert_eq!(
        sql,
        "from SURVEY SURVEY\ninner join EMPLOYEE EMPLOYEE\non SURVEY.ID = EMPLOYEE.SURVEY_ID"
    );
}

#[test]
fn cross_join_takes_no_condition() {
    let survey = table("SURVEY", "SURVEY");
    let other = table("OTHER", "OTHER");
    let err = from(survey.clone())
        .cross_join(other)
        .on(Expression::constant(true, ExprType::Bool))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::MalformedQuery(_)));
}

#[test]
fn having_requires_group_by() {
    let survey = table("SURVEY", "SURVEY");
    let id = survey.column("ID", ExprType::Int);
    let md = from(survey.clone())
        .having(id.count().gt(Expression::number(1)))
        .select([id.clone()])
        .build()
        .unwrap();
    let err = serialize(&md, &SqlTemplates::generic()).unwrap_err();
    assert!(matches!(err, Error::MalformedQuery(_)));
}

#[test]
fn with_prelude_names_a_subquery() {
    let survey = table("SURVEY", "SURVEY");
    let id = survey.column("ID", ExprType::Int);
    let inner = from(survey.clone()).select([id]).build().unwrap();

    let recent = table("recent", "recent");
    let recent_id = recent.column("ID", ExprType::Int);
    let md = from(recent.clone())
        .with("recent", inner)
        .select([recent_id])
        .build()
        .unwrap();

    let out = serialize(&md, &SqlTemplates::generic()).unwrap();
    assert_eq!(
        out.sql,
        "with recent as (select SURVEY.ID\nfrom SURVEY SURVEY)\n\
         select recent.ID\n\
         from recent recent"
    );
}

#[test]
fn union_combines_child_queries() {
    let a = table("A", "A");
    let b = table("B", "B");
    let qa = from(a.clone())
        .select([a.column("ID", ExprType::Int)])
        .build()
        .unwrap();
    let qb = from(b.clone())
        .select([b.column("ID", ExprType::Int)])
        .build()
        .unwrap();

    let md = union(vec![qa, qb]).build().unwrap();
    let out = serialize(&md, &SqlTemplates::generic()).unwrap();
    assert_eq!(
        out.sql,
        "select A.ID\nfrom A A\nunion\nselect B.ID\nfrom B B"
    );
}

#[test]
fn union_all_with_outer_ordering_and_limit() {
    let a = table("A", "A");
    let b = table("B", "B");
    let id_a = a.column("ID", ExprType::Int);
    let qa = from(a.clone()).select([id_a.clone()]).build().unwrap();
    let qb = from(b.clone())
        .select([b.column("ID", ExprType::Int)])
        .build()
        .unwrap();

    let order_target = Expression::from(quell_core::Path::variable("ID", ExprType::Int));
    let md = union_all(vec![qa, qb])
        .order_by([order_target.asc()])
        .limit(5)
        .build()
        .unwrap();
    let out = serialize(&md, &SqlTemplates::generic()).unwrap();
    assert_eq!(
        out.sql,
        "select A.ID\nfrom A A\nunion all\nselect B.ID\nfrom B B\norder by ID asc\nlimit 5"
    );
}

#[test]
fn h2_parenthesizes_set_operands() {
    let a = table("A", "A");
    let b = table("B", "B");
    let qa = from(a.clone())
        .select([a.column("ID", ExprType::Int)])
        .build()
        .unwrap();
    let qb = from(b.clone())
        .select([b.column("ID", ExprType::Int)])
        .build()
        .unwrap();

    let md = union(vec![qa, qb]).build().unwrap();
    let out = serialize(&md, &SqlTemplates::new(DialectType::H2)).unwrap();
    assert_eq!(
        out.sql,
        "(select A.ID\nfrom A A)\nunion\n(select B.ID\nfrom B B)"
    );
}

#[test]
fn set_op_requires_two_operands() {
    let a = table("A", "A");
    let qa = from(a.clone())
        .select([a.column("ID", ExprType::Int)])
        .build()
        .unwrap();
    let err = union(vec![qa]).build().unwrap_err();
    assert!(matches!(err, Error::MalformedQuery(_)));
}

#[test]
fn params_bind_through_metadata() {
    let survey = table("SURVEY", "SURVEY");
    let name = survey.column("NAME", ExprType::Str);
    let marker = Param::new("wanted", ExprType::Str);

    let md = from(survey.clone())
        .where_(name.eq(Expression::Param(marker.clone())))
        .set(marker, "picked")
        .select([name.clone()])
        .build()
        .unwrap();

    let out = serialize(&md, &SqlTemplates::generic()).unwrap();
    let bound = out.bind(md.params()).unwrap();
    assert_eq!(bound, vec![Value::Str("picked".into())]);
}

#[test]
fn end_flag_appends_fragment() {
    let survey = table("SURVEY", "SURVEY");
    let name = survey.column("NAME", ExprType::Str);
    let md = from(survey.clone())
        .add_flag(
            FlagPosition::End,
            Expression::template("\nfor update", Vec::new(), ExprType::Unknown),
        )
        .select([name.clone()])
        .build()
        .unwrap();

    let out = serialize(&md, &SqlTemplates::generic()).unwrap();
    assert!(out.sql.ends_with("\nfor update"));
}

#[test]
fn unique_flag_is_recorded() {
    let survey = table("SURVEY", "SURVEY");
    let md = from(survey.clone())
        .unique()
        .select([survey.column("ID", ExprType::Int)])
        .build()
        .unwrap();
    assert!(md.is_unique());
}
