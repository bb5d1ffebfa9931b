use super::response::failure;
use super::HttpState;
use actix_web::{get, web, HttpResponse, Responder};

#[get("/schools")]
async fn list_schools(data: web::Data<HttpState>) -> impl Responder {
    match data.catalog_use_case.schools().await {
        Ok(schools) => HttpResponse::Ok().json(schools),
        Err(e) => failure(&e, "Failed to fetch schools"),
    }
}

#[get("/professors")]
async fn list_professors(data: web::Data<HttpState>) -> impl Responder {
    match data.catalog_use_case.professors().await {
        Ok(professors) => HttpResponse::Ok().json(professors),
        Err(e) => failure(&e, "Failed to fetch professors"),
    }
}

#[get("/courses")]
async fn list_courses(data: web::Data<HttpState>) -> impl Responder {
    match data.catalog_use_case.courses().await {
        Ok(courses) => HttpResponse::Ok().json(courses),
        Err(e) => failure(&e, "Failed to fetch courses"),
    }
}
