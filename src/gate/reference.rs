//! Route table of the clinic application this gate fronts.
//!
//! The application historically exempted a large number of routes from
//! authentication, including routes that read or modify medical records,
//! patient data, accounts and vacation requests. Those entries are kept for
//! compatibility but carry a flag: they are reported at startup and removed
//! entirely when strict mode is on.

use axum::http::Method;

use super::policy::{Access, MethodMatch, PolicyError, RoutePolicy, RoutePolicyBuilder};

#[derive(Clone, Copy)]
enum On {
    Get,
    Post,
    GetPost,
}

impl On {
    fn methods(self) -> MethodMatch {
        match self {
            On::Get => MethodMatch::only([Method::GET]),
            On::Post => MethodMatch::only([Method::POST]),
            On::GetPost => MethodMatch::only([Method::GET, Method::POST]),
        }
    }
}

const MEDICAL_RECORD: &str = "exposes medical records without authentication";
const PATIENT_DATA: &str = "exposes patient data without authentication";
const ACCOUNT: &str = "allows account or staff management without authentication";
const VACATION: &str = "allows vacation requests without authentication";
const DESTRUCTIVE: &str = "allows destructive operations without authentication";
const PRESCRIPTION: &str = "exposes prescriptions without authentication";
const FINANCE: &str = "exposes financial reports without authentication";
const CHECKUP_WILDCARD: &str = "wildcard exempts every single-segment checkup read";

/// Credential optional, any method.
const PERMIT_ALL: &[&str] = &["/register", "/login", "/api/foo", "/getUser", "/h2-console/**"];

/// Gate bypassed entirely. `None` = plain exemption, `Some(reason)` = flagged.
const IGNORED: &[(On, &str, Option<&str>)] = &[
    // shared by GET and POST
    (On::GetPost, "/codebook", None),
    (On::GetPost, "/checkup/addReport", Some(MEDICAL_RECORD)),
    (On::GetPost, "/clinic/addRoom", None),
    (On::GetPost, "/clinic/deleteRoom", Some(DESTRUCTIVE)),
    (On::GetPost, "/checkUpType/deleteType/*", Some(DESTRUCTIVE)),
    (On::GetPost, "/checkup/getAllQuickApp/**", None),
    (On::GetPost, "/checkup/addAppointment", None),
    (On::GetPost, "/checkUpType/addType", None),
    (On::GetPost, "/clinic/searchClinic", None),
    (On::GetPost, "/searchDoctors", None),
    (On::GetPost, "/clinic/getSelectedDoctor", None),
    (On::GetPost, "/clinic/clinicDoctors", None),
    (On::GetPost, "/clinic/filterClinic/**", None),
    (On::GetPost, "/clinic/addRooms/*", None),
    (On::GetPost, "/editPatient", Some(PATIENT_DATA)),
    (On::GetPost, "/checkup/checkupRequest", None),
    (On::GetPost, "/changePassword", Some(ACCOUNT)),
    (On::GetPost, "/checkup/addRecipes/*", Some(PRESCRIPTION)),
    (On::GetPost, "/verifyRecipe/*", Some(PRESCRIPTION)),
    (On::GetPost, "/clinic/filterRooms", None),
    (On::GetPost, "/clinic/allDocsOneClinic/**", None),
    (On::GetPost, "/clinic/searchRooms", None),
    (On::GetPost, "/clinic/deleteRoom/*", Some(DESTRUCTIVE)),
    (On::GetPost, "/deleteDoctor", Some(DESTRUCTIVE)),
    (On::GetPost, "/findDoctors", None),
    (On::GetPost, "/clinic/changeRoom", None),
    (On::GetPost, "/findPatients", Some(PATIENT_DATA)),
    (On::GetPost, "/filterPatients", Some(PATIENT_DATA)),
    (On::GetPost, "/canAccessToMedicalRecord", Some(MEDICAL_RECORD)),
    (On::GetPost, "/bookForPatient", Some(PATIENT_DATA)),
    (On::GetPost, "/editMedicalRecord", Some(MEDICAL_RECORD)),
    (On::GetPost, "/checkup/update", None),
    (On::GetPost, "/changeDate/*", None),
    (On::GetPost, "/checkup/addDoctors/*", None),
    (On::GetPost, "/clinic/getRevenue", Some(FINANCE)),
    (On::GetPost, "/requestVacation/*", Some(VACATION)),
    (On::GetPost, "/vacationRequest", Some(VACATION)),
    // POST only
    (On::Post, "/clinic/changeNameOfType", None),
    (On::Post, "/clinic/searchOneType/*", None),
    (On::Post, "/clinic", None),
    (On::Post, "/addAdmin", Some(ACCOUNT)),
    (On::Post, "/codebook/*", None),
    (On::Post, "/updateMedicalWorker", Some(ACCOUNT)),
    (On::Post, "/updateAdministrator", Some(ACCOUNT)),
    (On::Post, "/clinic/updateClinic", None),
    (On::Post, "/sendConfirm", None),
    (On::Post, "/addMedicalWorker", Some(ACCOUNT)),
    (On::Post, "/activateEmail/*", None),
    (On::Post, "/clinic/rateClinic", None),
    (On::Post, "/rateMedicalWorker", None),
    (On::Post, "/checkup/patientHistory", Some(MEDICAL_RECORD)),
    (On::Post, "/checkup/scheduleCheckup/*", None),
    (On::Post, "/checkup/cancelCheckup/*", None),
    // GET only
    (On::Get, "/getAllDoctors", None),
    (On::Get, "/patientsRequests", Some(PATIENT_DATA)),
    (On::Get, "/getMedicalWorker", None),
    (On::Get, "/getAdministrator", Some(ACCOUNT)),
    (On::Get, "/clinic/getClinic", None),
    (On::Get, "/clinic/getDoctors", None),
    (On::Get, "/checkUpType/allTypesOneClinic/**", None),
    (On::Get, "/clinic/getDetails/*", None),
    (On::Get, "/getMedicalRecord", Some(MEDICAL_RECORD)),
    (On::Get, "/checkup/bookQuickApp/*", None),
    (On::Get, "/notifyPatient/*", None),
    (On::Get, "/notifyDoctor/*", None),
    (On::Get, "/getPatientProfile/*", Some(PATIENT_DATA)),
    (On::Get, "/clinic/getAllTypes", None),
    (On::Get, "/clinic/getRooms", None),
    (On::Get, "/checkUpType/addTypes", None),
    (On::Get, "/clinic/getClinics", None),
    (On::Get, "/getTypes", None),
    (On::Get, "/checkUpType/allTypes", None),
    (On::Get, "/patientHistory", Some(MEDICAL_RECORD)),
    (On::Get, "/checkup/*", Some(CHECKUP_WILDCARD)),
    (On::Get, "/getRecipes", Some(PRESCRIPTION)),
    (On::Get, "/clinic/getClinicsByType/*", None),
    (On::Get, "/getPatients", Some(PATIENT_DATA)),
    (On::Get, "/requestsForRoom", None),
    (On::Get, "/clinic/getClinicRaiting", None),
    (On::Get, "/clinic/getReportForMonth", Some(FINANCE)),
    (On::Get, "/clinic/getReportForWeek", Some(FINANCE)),
    (On::Get, "/getRequestForVacation", Some(VACATION)),
    (On::Get, "/clinic/getRooms/*", None),
    (On::Get, "/clinic/roomAvailability/*/*", None),
    (On::Get, "/getAllAvailable/*/*/*", None),
    (On::Get, "/checkup/getVacations/*", Some(VACATION)),
    (On::Get, "/checkup/getCheckups/*", None),
    (On::Get, "/rollingInTheDeep", None),
    (On::Get, "/checkup/getCheckup/*", None),
    // static assets
    (On::Get, "/", None),
    (On::Get, "/webjars/**", None),
    (On::Get, "/*.html", None),
    (On::Get, "/favicon.ico", None),
    (On::Get, "/**/*.html", None),
    (On::Get, "/**/*.css", None),
    (On::Get, "/**/*.js", None),
];

/// Routes served by this service itself.
fn own_routes(builder: RoutePolicyBuilder) -> RoutePolicyBuilder {
    builder.rule(MethodMatch::only([Method::GET]), "/health", Access::Ignore)
}

/// Build the reference policy. `strict` removes every flagged exemption.
pub fn reference_policy(strict: bool) -> Result<RoutePolicy, PolicyError> {
    let mut builder = own_routes(RoutePolicy::builder());

    for &(on, pattern, flag) in IGNORED {
        builder = match flag {
            Some(reason) => builder.flagged_rule(on.methods(), pattern, Access::Ignore, reason),
            None => builder.rule(on.methods(), pattern, Access::Ignore),
        };
    }

    for &pattern in PERMIT_ALL {
        builder = builder.rule(MethodMatch::Any, pattern, Access::Permit);
    }

    let policy = builder.build()?;
    Ok(if strict { policy.without_flagged() } else { policy })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_table_has_no_duplicates() {
        assert!(reference_policy(false).is_ok());
        assert!(reference_policy(true).is_ok());
    }

    #[test]
    fn login_and_get_user_are_public() {
        let policy = reference_policy(false).unwrap();
        assert_eq!(policy.resolve(&Method::POST, "/login"), Access::Permit);
        assert_eq!(policy.resolve(&Method::GET, "/getUser"), Access::Permit);
        assert_eq!(policy.resolve(&Method::DELETE, "/register"), Access::Permit);
    }

    #[test]
    fn get_clinic_is_listed_for_get_only() {
        let policy = reference_policy(false).unwrap();
        assert_eq!(policy.resolve(&Method::GET, "/clinic/getClinic"), Access::Ignore);
        assert_eq!(
            policy.resolve(&Method::POST, "/clinic/getClinic"),
            Access::Authenticate
        );
    }

    #[test]
    fn unlisted_routes_are_protected() {
        let policy = reference_policy(false).unwrap();
        assert_eq!(policy.resolve(&Method::POST, "/admin/delete"), Access::Authenticate);
        assert_eq!(policy.resolve(&Method::GET, "/me"), Access::Authenticate);
        assert_eq!(
            policy.resolve(&Method::DELETE, "/clinic/deleteRoom"),
            Access::Authenticate
        );
    }

    #[test]
    fn static_assets_are_public_at_any_depth() {
        let policy = reference_policy(true).unwrap();
        for path in ["/", "/index.html", "/a/b/c.css", "/js/app.js", "/webjars/x/y"] {
            assert_eq!(policy.resolve(&Method::GET, path), Access::Ignore, "{path}");
        }
    }

    #[test]
    fn sensitive_exemptions_are_flagged() {
        let policy = reference_policy(false).unwrap();
        let flagged: Vec<&str> = policy.flagged().map(|r| r.pattern.as_str()).collect();
        for path in [
            "/getMedicalRecord",
            "/editMedicalRecord",
            "/requestVacation/*",
            "/vacationRequest",
            "/changePassword",
            "/checkup/*",
        ] {
            assert!(flagged.contains(&path), "{path} should be flagged");
        }
        assert!(!flagged.contains(&"/clinic/getClinic"));
    }

    #[test]
    fn strict_policy_protects_flagged_routes() {
        let strict = reference_policy(true).unwrap();
        assert_eq!(
            strict.resolve(&Method::GET, "/getMedicalRecord"),
            Access::Authenticate
        );
        assert_eq!(
            strict.resolve(&Method::POST, "/requestVacation/12"),
            Access::Authenticate
        );
        assert_eq!(strict.resolve(&Method::GET, "/clinic/getClinic"), Access::Ignore);
    }

    #[test]
    fn checkup_wildcard_overlaps_specific_checkup_routes() {
        // Both entries exempt the route, so precedence does not change the outcome.
        let policy = reference_policy(false).unwrap();
        let hits = policy.overlapping_rules(&Method::GET, "/checkup/addReport");
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|r| r.access == Access::Ignore));

        let strict = reference_policy(true).unwrap();
        assert_eq!(
            strict.resolve(&Method::GET, "/checkup/addReport"),
            Access::Authenticate
        );
        assert_eq!(strict.resolve(&Method::GET, "/checkup/update"), Access::Ignore);
    }
}
