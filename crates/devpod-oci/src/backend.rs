use async_trait::async_trait;
use oci_api::{
    CreateInternetGatewayDetails, CreateRouteTableDetails, CreateSubnetDetails, CreateVcnDetails,
    Image, Instance, InstanceAction, InternetGateway, LaunchInstanceDetails, OciClient, RouteTable,
    Subnet, Vcn, Vnic, VnicAttachment,
};

/// The slice of the OCI Core API the provider drives.
///
/// `OciClient` is the production implementation; tests plug in an in-memory
/// compartment. List calls return every page.
#[async_trait]
pub trait OciBackend: Send + Sync {
    async fn list_vcns(&self, compartment_id: &str) -> oci_api::Result<Vec<Vcn>>;

    async fn create_vcn(&self, details: &CreateVcnDetails) -> oci_api::Result<Vcn>;

    async fn list_internet_gateways(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> oci_api::Result<Vec<InternetGateway>>;

    async fn create_internet_gateway(
        &self,
        details: &CreateInternetGatewayDetails,
    ) -> oci_api::Result<InternetGateway>;

    async fn list_route_tables(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> oci_api::Result<Vec<RouteTable>>;

    async fn create_route_table(
        &self,
        details: &CreateRouteTableDetails,
    ) -> oci_api::Result<RouteTable>;

    async fn list_subnets(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> oci_api::Result<Vec<Subnet>>;

    async fn create_subnet(&self, details: &CreateSubnetDetails) -> oci_api::Result<Subnet>;

    async fn list_images(
        &self,
        compartment_id: &str,
        display_name: &str,
    ) -> oci_api::Result<Vec<Image>>;

    async fn list_instances(
        &self,
        compartment_id: &str,
        display_name: &str,
    ) -> oci_api::Result<Vec<Instance>>;

    async fn launch_instance(&self, details: &LaunchInstanceDetails) -> oci_api::Result<Instance>;

    async fn instance_action(
        &self,
        instance_id: &str,
        action: InstanceAction,
    ) -> oci_api::Result<Instance>;

    async fn terminate_instance(
        &self,
        instance_id: &str,
        preserve_boot_volume: bool,
    ) -> oci_api::Result<()>;

    async fn list_vnic_attachments(
        &self,
        compartment_id: &str,
        instance_id: &str,
    ) -> oci_api::Result<Vec<VnicAttachment>>;

    async fn get_vnic(&self, vnic_id: &str) -> oci_api::Result<Vnic>;
}

#[async_trait]
impl OciBackend for OciClient {
    async fn list_vcns(&self, compartment_id: &str) -> oci_api::Result<Vec<Vcn>> {
        OciClient::list_vcns(self, compartment_id).await
    }

    async fn create_vcn(&self, details: &CreateVcnDetails) -> oci_api::Result<Vcn> {
        OciClient::create_vcn(self, details).await
    }

    async fn list_internet_gateways(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> oci_api::Result<Vec<InternetGateway>> {
        OciClient::list_internet_gateways(self, compartment_id, vcn_id).await
    }

    async fn create_internet_gateway(
        &self,
        details: &CreateInternetGatewayDetails,
    ) -> oci_api::Result<InternetGateway> {
        OciClient::create_internet_gateway(self, details).await
    }

    async fn list_route_tables(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> oci_api::Result<Vec<RouteTable>> {
        OciClient::list_route_tables(self, compartment_id, vcn_id).await
    }

    async fn create_route_table(
        &self,
        details: &CreateRouteTableDetails,
    ) -> oci_api::Result<RouteTable> {
        OciClient::create_route_table(self, details).await
    }

    async fn list_subnets(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> oci_api::Result<Vec<Subnet>> {
        OciClient::list_subnets(self, compartment_id, vcn_id).await
    }

    async fn create_subnet(&self, details: &CreateSubnetDetails) -> oci_api::Result<Subnet> {
        OciClient::create_subnet(self, details).await
    }

    async fn list_images(
        &self,
        compartment_id: &str,
        display_name: &str,
    ) -> oci_api::Result<Vec<Image>> {
        OciClient::list_images(self, compartment_id, display_name).await
    }

    async fn list_instances(
        &self,
        compartment_id: &str,
        display_name: &str,
    ) -> oci_api::Result<Vec<Instance>> {
        OciClient::list_instances(self, compartment_id, display_name).await
    }

    async fn launch_instance(&self, details: &LaunchInstanceDetails) -> oci_api::Result<Instance> {
        OciClient::launch_instance(self, details).await
    }

    async fn instance_action(
        &self,
        instance_id: &str,
        action: InstanceAction,
    ) -> oci_api::Result<Instance> {
        OciClient::instance_action(self, instance_id, action).await
    }

    async fn terminate_instance(
        &self,
        instance_id: &str,
        preserve_boot_volume: bool,
    ) -> oci_api::Result<()> {
        OciClient::terminate_instance(self, instance_id, preserve_boot_volume).await
    }

    async fn list_vnic_attachments(
        &self,
        compartment_id: &str,
        instance_id: &str,
    ) -> oci_api::Result<Vec<VnicAttachment>> {
        OciClient::list_vnic_attachments(self, compartment_id, instance_id).await
    }

    async fn get_vnic(&self, vnic_id: &str) -> oci_api::Result<Vnic> {
        OciClient::get_vnic(self, vnic_id).await
    }
}
