use url::Url;

use super::error::VpcClientError;

/// Regions with a public VPC endpoint.
pub const VPC_REGIONS: [&str; 10] = [
    "au-syd", "br-sao", "ca-tor", "eu-de", "eu-es", "eu-gb", "jp-osa", "jp-tok", "us-east",
    "us-south",
];

/// Returns the VPC API base url of `region`.
pub fn service_url_for_region(region: &str) -> Result<Url, VpcClientError> {
    if !VPC_REGIONS.contains(&region) {
        return Err(VpcClientError::UnknownRegion(region.to_string()));
    }
    Url::parse(&format!("https://{region}.iaas.cloud.ibm.com/v1"))
        .map_err(|e| VpcClientError::Encoder(e.to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("us-south", "https://us-south.iaas.cloud.ibm.com/v1")]
    #[case("eu-de", "https://eu-de.iaas.cloud.ibm.com/v1")]
    #[case("jp-tok", "https://jp-tok.iaas.cloud.ibm.com/v1")]
    #[case("br-sao", "https://br-sao.iaas.cloud.ibm.com/v1")]
    fn known_regions(#[case] region: &str, #[case] expected: &str) {
        assert_eq!(service_url_for_region(region).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("us-south-1")]
    #[case("US-SOUTH")]
    #[case("evil.com/")]
    fn unknown_regions(#[case] region: &str) {
        let err = service_url_for_region(region).unwrap_err();
        assert_matches!(err, VpcClientError::UnknownRegion(r) => assert_eq!(r, region));
    }
}
