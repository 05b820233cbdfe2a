use crate::models::{Post, RouteDescriptor, RouteParams, RouteProps};

/// One route per post that does not supply its own preview image.
pub fn static_paths(posts: &[Post]) -> Vec<RouteDescriptor> {
    posts
        .iter()
        .filter(|post| !post.data.has_og_image())
        .map(|post| RouteDescriptor {
            params: RouteParams { slug: post.id.clone() },
            props: RouteProps {
                pub_date: post.data.effective_date(),
                title: post.data.title.clone(),
            },
        })
        .collect()
}
