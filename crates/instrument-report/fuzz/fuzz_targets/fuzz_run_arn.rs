#![no_main]

//! Fuzz target for Device Farm run URL construction
//!
//! Arbitrary ARNs must never panic, and any URL produced must embed the
//! project and run ids taken from the ARN.

use libfuzzer_sys::fuzz_target;

use instrument_report::devicefarm_run_url;

fuzz_target!(|arn: &str| {
    if let Some(url) = devicefarm_run_url(arn) {
        assert!(url.ends_with("/jobs/00000"));
        let (_, resource) = arn.rsplit_once(':').expect("URL requires a ':'");
        let (project, run) = resource.split_once('/').expect("URL requires a '/'");
        assert!(url.contains(&format!("/projects/{project}/runs/{run}/")));
    }
});
