use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::api::{ApiClient, ApiError, Method};
use super::cache::QueryCache;
use super::toast::{Toast, Toaster};

pub const EQUIPMENT_PATH: &str = "/api/equipment";

const ERROR_TITLE: &str = "Lỗi";
const RETRY: &str = "Vui lòng thử lại.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: u64,
    pub name: String,
    pub part_number: String,
    pub category_id: Option<u64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
}

/// Fields of the create/edit dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentForm {
    pub name: String,
    pub part_number: String,
    pub category_id: Option<u64>,
    pub description: String,
    pub is_active: bool,
}

impl EquipmentForm {
    /// Labels of required fields left blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("tên");
        }
        if self.part_number.trim().is_empty() {
            missing.push("mã linh kiện");
        }
        if self.category_id.is_none() {
            missing.push("danh mục");
        }
        missing
    }
}

impl From<&Equipment> for EquipmentForm {
    fn from(equipment: &Equipment) -> Self {
        Self {
            name: equipment.name.clone(),
            part_number: equipment.part_number.clone(),
            category_id: equipment.category_id,
            description: equipment.description.clone(),
            is_active: equipment.is_active,
        }
    }
}

/// The equipment inventory screen: a cached list plus create, update,
/// activate/deactivate and delete actions.
#[derive(Debug)]
pub struct EquipmentScreen<A, T> {
    api: A,
    toaster: T,
    cache: QueryCache,
    pending: HashSet<u64>,
}

impl<A: ApiClient, T: Toaster> EquipmentScreen<A, T> {
    pub fn new(api: A, toaster: T) -> Self {
        Self {
            api,
            toaster,
            cache: QueryCache::new(),
            pending: HashSet::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    pub fn toaster(&self) -> &T {
        &self.toaster
    }

    /// True while a request for `id` is outstanding; its controls render
    /// disabled.
    pub fn is_pending(&self, id: u64) -> bool {
        self.pending.contains(&id)
    }

    /// The list as the user sees it. A failed load shows nothing and toasts.
    pub fn equipment(&mut self) -> Vec<Equipment> {
        let loaded = self
            .cache
            .fetch(EQUIPMENT_PATH, &mut self.api)
            .and_then(|value| {
                serde_json::from_value::<Vec<Equipment>>(value.clone())
                    .map_err(|err| ApiError::Decode(err.to_string()))
            });
        match loaded {
            Ok(items) => items,
            Err(err) => {
                self.fail("tải danh sách thiết bị", &err);
                Vec::new()
            }
        }
    }

    pub fn create(&mut self, form: &EquipmentForm) -> bool {
        if !self.validate(form) {
            return false;
        }
        let body = json!(form);
        match self.api.request(Method::Post, EQUIPMENT_PATH, Some(&body)) {
            Ok(_) => {
                self.cache.invalidate(EQUIPMENT_PATH);
                self.toaster
                    .toast(Toast::success("Thành công", "Đã thêm thiết bị mới."));
                true
            }
            Err(err) => {
                self.fail("thêm thiết bị", &err);
                false
            }
        }
    }

    pub fn update(&mut self, id: u64, form: &EquipmentForm) -> bool {
        if !self.validate(form) {
            return false;
        }
        let body = json!(form);
        let ok = self.send(id, Method::Patch, Some(&body), "cập nhật thiết bị");
        if ok {
            self.toaster
                .toast(Toast::success("Thành công", "Đã cập nhật thiết bị."));
        }
        ok
    }

    /// Flips `isActive`. The list only changes once the backend accepted it.
    pub fn toggle_active(&mut self, equipment: &Equipment) -> bool {
        let body = json!({ "isActive": !equipment.is_active });
        self.send(equipment.id, Method::Patch, Some(&body), "cập nhật trạng thái thiết bị")
    }

    pub fn delete(&mut self, id: u64) -> bool {
        let ok = self.send(id, Method::Delete, None, "xóa thiết bị");
        if ok {
            self.toaster.toast(Toast::success("Thành công", "Đã xóa thiết bị."));
        }
        ok
    }

    fn send(&mut self, id: u64, method: Method, body: Option<&Value>, action: &str) -> bool {
        if !self.pending.insert(id) {
            debug!(id, %method, "request already outstanding");
            return false;
        }
        let path = format!("{EQUIPMENT_PATH}/{id}");
        let result = self.api.request(method, &path, body);
        self.pending.remove(&id);
        match result {
            Ok(_) => {
                self.cache.invalidate(EQUIPMENT_PATH);
                true
            }
            Err(err) => {
                self.fail(action, &err);
                false
            }
        }
    }

    fn validate(&mut self, form: &EquipmentForm) -> bool {
        let missing = form.missing_fields();
        if missing.is_empty() {
            return true;
        }
        self.toaster.toast(Toast::failure(
            "Thiếu thông tin",
            format!("Vui lòng nhập {}.", missing.join(", ")),
        ));
        false
    }

    fn fail(&mut self, action: &str, err: &ApiError) {
        warn!(error = %err, action, "cms request failed");
        self.toaster
            .toast(Toast::failure(ERROR_TITLE, format!("Không thể {action}. {RETRY}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{MemoryApi, ToastLog};

    fn screen() -> EquipmentScreen<MemoryApi, ToastLog> {
        let mut api = MemoryApi::new();
        api.seed(
            EQUIPMENT_PATH,
            vec![
                json!({"id": 1, "name": "Switch 24 port", "partNumber": "SW-24", "categoryId": 3, "isActive": true}),
                json!({"id": 2, "name": "Rack 42U", "partNumber": "RK-42", "categoryId": 5, "isActive": false}),
            ],
        );
        EquipmentScreen::new(api, ToastLog::new())
    }

    fn form() -> EquipmentForm {
        EquipmentForm {
            name: "Router".to_string(),
            part_number: "RT-1".to_string(),
            category_id: Some(3),
            description: String::new(),
            is_active: true,
        }
    }

    #[test]
    fn lists_equipment_through_the_cache() {
        let mut screen = screen();
        let items = screen.equipment();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].part_number, "SW-24");
        screen.equipment();
        assert_eq!(screen.api().requests().len(), 1);
    }

    #[test]
    fn failed_toggle_leaves_the_list_unchanged() {
        let mut screen = screen();
        let before = screen.equipment();
        let switch = before[0].clone();
        assert!(switch.is_active);

        screen.api_mut().fail_next(Method::Patch, "/api/equipment/1");
        assert!(!screen.toggle_active(&switch));
        assert!(!screen.is_pending(1));

        let after = screen.equipment();
        assert_eq!(after, before);
        assert!(after[0].is_active);
        assert_eq!(screen.toaster().failures(), 1);
        assert_eq!(screen.toaster().toasts().len(), 1);
        let toast = screen.toaster().last().expect("toast");
        assert!(toast.description.starts_with("Không thể"));
        assert!(toast.description.ends_with("Vui lòng thử lại."));
    }

    #[test]
    fn successful_toggle_refetches_the_list() {
        let mut screen = screen();
        let switch = screen.equipment()[0].clone();
        assert!(screen.toggle_active(&switch));
        assert!(!screen.equipment()[0].is_active);
        assert_eq!(screen.toaster().failures(), 0);
        assert_eq!(
            screen.api().requests().last(),
            Some(&(Method::Get, EQUIPMENT_PATH.to_string()))
        );
    }

    #[test]
    fn invalid_forms_toast_before_any_request() {
        let mut screen = screen();
        let incomplete = EquipmentForm {
            part_number: " ".to_string(),
            category_id: None,
            ..form()
        };
        assert!(!screen.create(&incomplete));
        assert!(!screen.update(1, &incomplete));
        assert!(screen.api().requests().is_empty());
        assert_eq!(
            screen.toaster().last().map(|toast| toast.description.as_str()),
            Some("Vui lòng nhập mã linh kiện, danh mục.")
        );
    }

    #[test]
    fn create_update_and_delete() {
        let mut screen = screen();
        assert!(screen.create(&form()));
        let items = screen.equipment();
        assert_eq!(items.len(), 3);
        let router = items[2].clone();
        assert_eq!(router.name, "Router");

        let renamed = EquipmentForm {
            name: "Edge router".to_string(),
            ..EquipmentForm::from(&router)
        };
        assert!(screen.update(router.id, &renamed));
        assert_eq!(screen.equipment()[2].name, "Edge router");

        assert!(screen.delete(router.id));
        assert_eq!(screen.equipment().len(), 2);
        assert_eq!(screen.toaster().failures(), 0);
    }

    #[test]
    fn failed_loads_show_an_empty_list_once() {
        let mut screen = screen();
        screen.api_mut().fail_next(Method::Get, EQUIPMENT_PATH);
        assert!(screen.equipment().is_empty());
        assert_eq!(screen.toaster().failures(), 1);
        assert_eq!(screen.equipment().len(), 2);
    }
}
