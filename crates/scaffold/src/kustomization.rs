//! Rendering of the `<sourceDir>/kustomization.yaml` placeholder.
//! GitOps engine resources are always created server-side during bring-up,
//! never scaffolded onto disk here.

/// The empty-resources placeholder kustomization written into the
/// workload source directory on scaffold.
#[must_use]
pub fn render_kustomization_yaml() -> String {
    "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nresources: []\n".to_string()
}
