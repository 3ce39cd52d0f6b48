use sqlx::{Postgres, QueryBuilder};

use crate::modules::audience::model::Viewer;

/// Pushes a boolean SQL expression selecting rows `viewer` may see.
///
/// Expects the queried table to carry `uploaded_by UUID`, `individuals UUID[]`
/// and `audience JSONB` (an array of `{role, sub_role?, batch?}` objects, stored
/// normalized so a missing key is the wildcard). Mirrors `Audience::is_visible_to`.
pub fn push_visibility_filter(qb: &mut QueryBuilder<'_, Postgres>, viewer: &Viewer) {
    qb.push("(uploaded_by = ")
        .push_bind(viewer.id)
        .push(" OR ")
        .push_bind(viewer.id)
        .push(" = ANY(individuals)")
        .push(" OR EXISTS (SELECT 1 FROM jsonb_array_elements(audience) AS rule WHERE rule->>'role' = 'All' OR (rule->>'role' = ")
        .push_bind(viewer.role.as_str());

    qb.push(" AND (rule->>'sub_role' IS NULL");
    if let Some(code) = &viewer.sub_role {
        qb.push(" OR rule->>'sub_role' = ").push_bind(code.clone());
    }
    qb.push(")");

    if viewer.role.is_student() {
        qb.push(" AND (rule->>'batch' IS NULL");
        if let Some(batch) = &viewer.batch {
            qb.push(" OR rule->>'batch' = ").push_bind(batch.clone());
        }
        qb.push(")");
    }

    qb.push(")))");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{
        audience::model::{Audience, TargetRule},
        user::schema::UserRole,
    };
    use sqlx::types::Json;
    use uuid::Uuid;

    fn render(viewer: &Viewer) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM notices WHERE ");
        push_visibility_filter(&mut qb, viewer);
        qb.sql().to_string()
    }

    #[test]
    fn student_filter_constrains_sub_role_and_batch() {
        let sql = render(&Viewer {
            id: Uuid::now_v7(),
            role: UserRole::Student,
            sub_role: Some("CSE".into()),
            batch: Some("2022".into()),
        });

        assert!(sql.contains("uploaded_by = $1"));
        assert!(sql.contains("$2 = ANY(individuals)"));
        assert!(sql.contains("rule->>'role' = $3"));
        assert!(sql.contains("rule->>'sub_role' = $4"));
        assert!(sql.contains("rule->>'batch' = $5"));
        assert_eq!(sql.matches('(').count(), sql.matches(')').count());
    }

    #[test]
    fn staff_filter_ignores_batch() {
        let sql = render(&Viewer {
            id: Uuid::now_v7(),
            role: UserRole::Faculty,
            sub_role: Some("IT".into()),
            batch: None,
        });

        assert!(!sql.contains("batch"));
        assert!(sql.contains("rule->>'sub_role' = $4"));
        assert_eq!(sql.matches('(').count(), sql.matches(')').count());
    }

    #[test]
    fn viewer_without_department_only_matches_wildcard_rules() {
        let sql = render(&Viewer { id: Uuid::now_v7(), role: UserRole::Dean, sub_role: None, batch: None });

        assert!(sql.contains("(rule->>'sub_role' IS NULL)"));
        assert!(!sql.contains("$4"));
    }

    fn viewer(role: UserRole, sub_role: Option<&str>, batch: Option<&str>) -> Viewer {
        Viewer {
            id: Uuid::now_v7(),
            role,
            sub_role: sub_role.map(Into::into),
            batch: batch.map(Into::into),
        }
    }

    /// Needs a reachable `DATABASE_URL`; returns early without one.
    #[tokio::test]
    async fn sql_filter_agrees_with_in_memory_policy() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };
        let pool = sqlx::PgPool::connect(&url).await.unwrap();

        let viewers = vec![
            viewer(UserRole::Student, Some("CSE"), Some("2022")),
            viewer(UserRole::Student, Some("CSE"), Some("2023")),
            viewer(UserRole::Student, Some("IT"), Some("2022")),
            viewer(UserRole::Faculty, Some("CSE"), None),
            viewer(UserRole::Dean, None, None),
        ];
        let uploader = viewers[3].id;

        let documents: Vec<(Uuid, Uuid, Audience)> = vec![
            vec![TargetRule::role(UserRole::Student).with_sub_role("cse").with_batch("2022")],
            vec![TargetRule::role(UserRole::Student).with_sub_role("All")],
            vec![TargetRule::role(UserRole::Faculty).with_sub_role("CSE").with_batch("2022")],
            vec![TargetRule::role(UserRole::Dean)],
            vec![TargetRule::everyone()],
            vec![TargetRule::role(UserRole::Officers)],
        ]
        .into_iter()
        .enumerate()
        .map(|(i, rules)| {
            let individuals = if i == 5 { vec![viewers[2].id] } else { Vec::new() };
            let uploaded_by = if i == 3 { uploader } else { Uuid::now_v7() };
            (Uuid::now_v7(), uploaded_by, Audience::new(rules, individuals).unwrap())
        })
        .collect();

        for viewer in &viewers {
            let mut qb = QueryBuilder::<Postgres>::new(
                "WITH docs (id, uploaded_by, individuals, audience) AS (",
            );
            qb.push_values(&documents, |mut row, (id, uploaded_by, audience)| {
                row.push_bind(*id)
                    .push_bind(*uploaded_by)
                    .push_bind(audience.individuals.clone())
                    .push_bind(Json(audience.rules.clone()));
            });
            qb.push(") SELECT id FROM docs WHERE ");
            push_visibility_filter(&mut qb, viewer);

            let mut from_sql: Vec<Uuid> =
                qb.build_query_scalar().fetch_all(&pool).await.unwrap();
            from_sql.sort();

            let mut in_memory: Vec<Uuid> = documents
                .iter()
                .filter(|(_, uploaded_by, audience)| audience.is_visible_to(viewer, *uploaded_by))
                .map(|(id, _, _)| *id)
                .collect();
            in_memory.sort();

            assert_eq!(from_sql, in_memory, "viewer {:?}", viewer);
        }
    }
}
