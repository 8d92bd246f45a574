//! Process forms: the request payload that triggers a workflow.
//!
//! Forms are a tagged union. Listeners that work on a group read it through
//! [`ProcessForm::group_request`] rather than matching on variants.

use serde::{Deserialize, Serialize};

use crate::group::GroupRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form_name", rename_all = "snake_case")]
pub enum ProcessForm {
  /// Provision resources for a newly approved group.
  GroupResource(GroupResourceForm),
  /// Suspend, restart or delete an existing group.
  UpdateGroup(UpdateGroupForm),
  /// Request consumption of a group's data.
  NewConsumption(NewConsumptionForm),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResourceForm {
  pub group_info: GroupRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperateType {
  Suspend,
  Restart,
  Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateGroupForm {
  pub group_info: GroupRequest,
  pub operate_type: OperateType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConsumptionForm {
  pub consumption_id: i32,
  pub group_id: String,
  pub topic: String,
  pub consumer_group: String,
}

impl ProcessForm {
  pub fn form_name(&self) -> &'static str {
    match self {
      ProcessForm::GroupResource(_) => "group_resource",
      ProcessForm::UpdateGroup(_) => "update_group",
      ProcessForm::NewConsumption(_) => "new_consumption",
    }
  }

  /// The group request carried by this form, if the form is group-scoped.
  pub fn group_request(&self) -> Option<&GroupRequest> {
    match self {
      ProcessForm::GroupResource(form) => Some(&form.group_info),
      ProcessForm::UpdateGroup(form) => Some(&form.group_info),
      ProcessForm::NewConsumption(_) => None,
    }
  }

  pub fn group_request_mut(&mut self) -> Option<&mut GroupRequest> {
    match self {
      ProcessForm::GroupResource(form) => Some(&mut form.group_info),
      ProcessForm::UpdateGroup(form) => Some(&mut form.group_info),
      ProcessForm::NewConsumption(_) => None,
    }
  }
}

impl From<GroupResourceForm> for ProcessForm {
  fn from(form: GroupResourceForm) -> Self {
    ProcessForm::GroupResource(form)
  }
}

impl From<UpdateGroupForm> for ProcessForm {
  fn from(form: UpdateGroupForm) -> Self {
    ProcessForm::UpdateGroup(form)
  }
}
