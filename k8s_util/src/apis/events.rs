use k8s_openapi::api::core::v1::Event;
use kube::api::ListParams;

use super::Apis;

/// Field selector matching the events recorded against one pod.
pub fn pod_event_selector(pod_name: &str) -> String {
    format!("involvedObject.name={},involvedObject.kind=Pod", pod_name)
}

/// Events
impl Apis {
    pub async fn pod_events(&self, pod_name: &str) -> kube::Result<Vec<Event>> {
        let params = ListParams::default().fields(&pod_event_selector(pod_name));
        let events = self.event.list(&params).await?;
        Ok(events.items)
    }
}
