//! Planner plan lookup and task creation.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{GraphClient, GraphError, Plan, TaskTracker, TrackedTask};

#[async_trait]
impl TaskTracker for GraphClient {
    async fn personal_plan(&self, user_id: &str, display_name: &str) -> anyhow::Result<Plan> {
        let result = self.get(&format!("/users/{}/planner/plans", user_id)).await?;
        let plans = result
            .pointer("/value")
            .and_then(Value::as_array)
            .map(|plans| plans.iter().map(plan_from_value).collect())
            .unwrap_or_default();

        pick_personal_plan(plans, display_name).ok_or_else(|| {
            anyhow::anyhow!(
                "no Planner plans found for user {}; create a plan in Microsoft Planner first",
                user_id
            )
        })
    }

    async fn create_task(
        &self,
        plan_id: &str,
        title: &str,
        assignee_ids: &[String],
        due_date: Option<&str>,
        description: Option<&str>,
    ) -> anyhow::Result<TrackedTask> {
        let mut body = json!({
            "planId": plan_id,
            "title": title,
            "assignments": assignments_for(assignee_ids),
        });
        if let Some(due) = due_date {
            body["dueDateTime"] = json!(due);
        }

        let task = self.post("/planner/tasks", &body).await?;
        let task_id = task
            .pointer("/id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if let (Some(description), false) = (description, task_id.is_empty()) {
            self.update_task_description(&task_id, description).await?;
        }

        Ok(TrackedTask {
            id: task_id,
            plan_id: plan_id.to_string(),
            title: title.to_string(),
            due_date: due_date.map(str::to_string),
        })
    }
}

impl GraphClient {
    /// Patch a task's description. Planner requires the current etag on
    /// every details update.
    async fn update_task_description(
        &self,
        task_id: &str,
        description: &str,
    ) -> anyhow::Result<()> {
        let path = format!("/planner/tasks/{}/details", task_id);
        let details = self.get(&path).await?;
        let etag = details
            .pointer("/@odata.etag")
            .and_then(Value::as_str)
            .ok_or_else(|| GraphError::Shape("task details response missing etag".to_string()))?;

        self.patch_with_etag(&path, etag, &json!({ "description": description }))
            .await
    }
}

/// Build the Planner assignments map for a set of user ids.
fn assignments_for(assignee_ids: &[String]) -> Value {
    let mut assignments = Map::new();
    for user_id in assignee_ids {
        assignments.insert(
            user_id.clone(),
            json!({
                "@odata.type": "#microsoft.graph.plannerAssignment",
                "orderHint": " !",
            }),
        );
    }
    Value::Object(assignments)
}

fn plan_from_value(value: &Value) -> Plan {
    Plan {
        id: value
            .pointer("/id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        title: value
            .pointer("/title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        owner: value
            .pointer("/owner")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Pick a user's personal plan: "{displayName}'s Tasks" when it exists,
/// otherwise the first available plan. `None` when the user has no plans.
fn pick_personal_plan(plans: Vec<Plan>, display_name: &str) -> Option<Plan> {
    let personal_title = format!("{}'s Tasks", display_name);
    if let Some(plan) = plans.iter().find(|p| p.title == personal_title) {
        return Some(plan.clone());
    }
    plans.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(id: &str, title: &str) -> Plan {
        Plan {
            id: id.to_string(),
            title: title.to_string(),
            owner: "group-1".to_string(),
        }
    }

    #[test]
    fn prefers_personal_plan_by_title() {
        let plans = vec![plan("p1", "Team Backlog"), plan("p2", "Jane Doe's Tasks")];
        let picked = pick_personal_plan(plans, "Jane Doe").unwrap();
        assert_eq!(picked.id, "p2");
    }

    #[test]
    fn falls_back_to_first_plan() {
        let plans = vec![plan("p1", "Team Backlog"), plan("p2", "Other")];
        let picked = pick_personal_plan(plans, "Jane Doe").unwrap();
        assert_eq!(picked.id, "p1");
    }

    #[test]
    fn no_plans_yields_none() {
        assert!(pick_personal_plan(Vec::new(), "Jane Doe").is_none());
    }

    #[test]
    fn assignments_carry_odata_type() {
        let value = assignments_for(&["u1".to_string(), "u2".to_string()]);
        assert_eq!(
            value.pointer("/u1/@odata.type").unwrap(),
            "#microsoft.graph.plannerAssignment"
        );
        assert_eq!(value.pointer("/u2/orderHint").unwrap(), " !");
    }
}
